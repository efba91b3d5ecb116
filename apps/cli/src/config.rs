//! Configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `$XDG_CONFIG_HOME/dlcpwn/config.toml` (or `~/.config/...`)
//! - Windows: `%APPDATA%/dlcpwn/config.toml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for cached storefront responses.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Directory holding `cream_api/` and `scream_api/` shim binaries.
    #[serde(default = "default_payload_dir")]
    pub payload_dir: PathBuf,

    /// Steam install directory, detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_path: Option<PathBuf>,

    /// Epic Games Launcher manifest directory, detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic_manifests_path: Option<PathBuf>,

    /// HTTP timeout for storefront requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_cache_dir() -> PathBuf {
    config_dir().join("dlcpwn").join("app_info")
}

fn default_payload_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("payloads")))
        .unwrap_or_else(|| PathBuf::from("payloads"))
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            payload_dir: default_payload_dir(),
            steam_path: None,
            epic_manifests_path: None,
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`, writing defaults there if missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

/// Returns the default configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("dlcpwn").join("config.toml")
}

fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        PathBuf::from(
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into()),
        )
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            return PathBuf::from(xdg);
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home).join(".config")
    }
}
