//! `.item` manifests written by the Epic Games Launcher.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::EpicError;
use crate::paths::expand_env_vars;

/// The subset of an `.item` manifest dlcpwn reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemManifest {
    #[serde(rename = "bIsApplication", default = "default_true")]
    pub is_application: bool,
    #[serde(rename = "InstallLocation", default)]
    pub install_location: String,
    #[serde(rename = "DisplayName", default)]
    pub display_name: String,
    #[serde(rename = "CatalogNamespace", default)]
    pub catalog_namespace: String,
}

fn default_true() -> bool {
    true
}

impl ItemManifest {
    /// Parses a manifest file.
    pub fn load(path: &Path) -> Result<Self, EpicError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Returns the install location with environment references expanded.
    pub fn install_dir(&self) -> PathBuf {
        PathBuf::from(expand_env_vars(&self.install_location))
    }

    /// Returns true if this manifest describes a playable game.
    ///
    /// Add-ons carry `bIsApplication: false`; manifests without a namespace
    /// or install location cannot be patched.
    pub fn is_game(&self) -> bool {
        self.is_application
            && !self.catalog_namespace.is_empty()
            && !self.install_location.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_manifest() {
        let json = r#"{
            "FormatVersion": 0,
            "bIsApplication": true,
            "DisplayName": "Fall Guys",
            "InstallLocation": "C:\\Games\\FallGuys",
            "CatalogNamespace": "0a2d9f6403244d12969e11da6713137b",
            "AppName": "0a2d9f6403244d12969e11da6713137b"
        }"#;
        let m: ItemManifest = serde_json::from_str(json).unwrap();
        assert!(m.is_game());
        assert_eq!(m.display_name, "Fall Guys");
        assert_eq!(m.install_location, "C:\\Games\\FallGuys");
        assert_eq!(m.catalog_namespace, "0a2d9f6403244d12969e11da6713137b");
    }

    #[test]
    fn missing_application_flag_defaults_to_game() {
        let json = r#"{ "DisplayName": "G", "InstallLocation": "/g", "CatalogNamespace": "ns" }"#;
        let m: ItemManifest = serde_json::from_str(json).unwrap();
        assert!(m.is_application);
        assert!(m.is_game());
    }

    #[test]
    fn addons_and_incomplete_manifests_are_not_games() {
        let addon = r#"{ "bIsApplication": false, "InstallLocation": "/g", "CatalogNamespace": "ns" }"#;
        assert!(!serde_json::from_str::<ItemManifest>(addon).unwrap().is_game());

        let no_ns = r#"{ "InstallLocation": "/g" }"#;
        assert!(!serde_json::from_str::<ItemManifest>(no_ns).unwrap().is_game());
    }

    #[test]
    fn load_rejects_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.item");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(ItemManifest::load(&path), Err(EpicError::Json(_))));
        assert!(matches!(
            ItemManifest::load(&tmp.path().join("missing.item")),
            Err(EpicError::Io(_))
        ));
    }
}
