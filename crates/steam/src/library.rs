//! Steam library scan: library folders, app manifests and API directories.

use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use dlcpwn_model::{Game, GameCatalog, Platform};
use tracing::{debug, info, warn};

use crate::paths::{Paths, game_dir};
use crate::vdf::{VdfValue, load_text_vdf, parse_text_vdf};
use crate::SteamError;

/// The fields of an `appmanifest_<id>.acf` file dlcpwn cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct AppManifest {
    pub app_id: String,
    pub name: String,
    pub build_id: u64,
    pub install_dir: String,
    /// Beta branch, `public` when none is set.
    pub branch: String,
}

impl AppManifest {
    /// Parses manifest content.
    ///
    /// `appid`, `name`, `buildid` and `installdir` must be present and
    /// non-empty; `appid` and `buildid` must be integers.
    pub fn from_vdf(content: &str) -> Result<Self, SteamError> {
        let root = parse_text_vdf(content)?;
        let app = root
            .get("AppState")
            .ok_or_else(|| SteamError::Manifest("missing AppState".into()))?;

        let field = |key: &str| -> Result<String, SteamError> {
            app.get_str(key)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| SteamError::Manifest(format!("missing '{key}'")))
        };

        let app_id = field("appid")?;
        let name = field("name")?;
        let install_dir = field("installdir")?;
        let build_id = field("buildid")?
            .parse::<u64>()
            .map_err(|e| SteamError::Manifest(format!("invalid buildid: {e}")))?;
        app_id
            .parse::<u64>()
            .map_err(|e| SteamError::Manifest(format!("invalid appid '{app_id}': {e}")))?;

        let branch = beta_key(app, "UserConfig")
            .or_else(|| beta_key(app, "MountedConfig"))
            .unwrap_or("public")
            .to_string();

        Ok(Self {
            app_id,
            name,
            build_id,
            install_dir,
            branch,
        })
    }
}

fn beta_key<'a>(app: &'a VdfValue, section: &str) -> Option<&'a str> {
    app.get(section)?
        .get_str("BetaKey")
        .filter(|key| !key.is_empty())
}

/// Extracts library paths from libraryfolders.vdf content.
///
/// Only numerically keyed entries are libraries. Both the current format
/// (`"0" { "path" "..." }`) and the legacy one (`"1" "D:\\Steam"`) are read.
pub fn parse_library_folders(content: &str) -> Result<Vec<PathBuf>, SteamError> {
    let root = parse_text_vdf(content)?;
    Ok(library_folders_from(&root))
}

fn library_folders_from(root: &VdfValue) -> Vec<PathBuf> {
    let Some(folders) = root.get("libraryfolders").and_then(VdfValue::as_object) else {
        return Vec::new();
    };

    folders
        .iter()
        .filter(|(key, _)| !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|(_, value)| match value {
            VdfValue::String(path) => Some(path.as_str()),
            VdfValue::Object(_) => value.get_str("path"),
        })
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Game catalog backed by the local Steam installation.
pub struct SteamLibrary {
    paths: Option<Paths>,
    api_files: Vec<String>,
}

impl SteamLibrary {
    /// Creates a catalog over `paths`, locating API directories by `api_files`.
    ///
    /// With `paths` set to `None` the catalog is empty.
    pub fn new(paths: Option<Paths>, api_files: Vec<String>) -> Self {
        Self { paths, api_files }
    }

    /// Creates a catalog over the auto-detected Steam installation.
    pub fn detect(api_files: Vec<String>) -> Self {
        let paths = match Paths::new() {
            Ok(paths) => Some(paths),
            Err(e) => {
                warn!(error = %e, "steam installation not detected");
                None
            }
        };
        Self::new(paths, api_files)
    }

    /// Returns every existing steamapps directory, sorted.
    pub fn library_directories(&self) -> Vec<PathBuf> {
        let Some(paths) = &self.paths else {
            return Vec::new();
        };

        let primary = paths.steamapps_dir();
        if !primary.is_dir() {
            return Vec::new();
        }

        let mut dirs = vec![primary];
        match load_text_vdf(&paths.library_folders_path()) {
            Ok(root) => {
                for library in library_folders_from(&root) {
                    let steamapps = library.join("steamapps");
                    if steamapps.is_dir() && !dirs.contains(&steamapps) {
                        dirs.push(steamapps);
                    }
                }
            }
            Err(e) => debug!(error = %e, "no additional library folders"),
        }

        dirs.sort();
        dirs
    }

    /// Reads every valid app manifest in one steamapps directory.
    ///
    /// Manifests that fail to parse or whose game directory is missing are
    /// skipped. Duplicate app ids keep their first occurrence.
    pub fn manifests_in(&self, steamapps: &Path) -> Vec<(AppManifest, PathBuf)> {
        let Ok(entries) = std::fs::read_dir(steamapps) else {
            return Vec::new();
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "acf"))
            .collect();
        files.sort();

        let mut seen = HashSet::new();
        let mut manifests = Vec::new();
        for file in files {
            let manifest = match std::fs::read_to_string(&file)
                .map_err(|e| SteamError::Io(e.to_string()))
                .and_then(|content| AppManifest::from_vdf(&content))
            {
                Ok(m) => m,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping app manifest");
                    continue;
                }
            };

            let dir = game_dir(steamapps, &manifest.install_dir);
            if !dir.is_dir() || !seen.insert(manifest.app_id.clone()) {
                continue;
            }
            manifests.push((manifest, dir));
        }

        manifests
    }

    /// Scans all libraries and resolves each game's API directory.
    pub fn scan(&self) -> Vec<Game> {
        let mut seen = HashSet::new();
        let mut games = Vec::new();

        for library in self.library_directories() {
            for (manifest, install_dir) in self.manifests_in(&library) {
                if !seen.insert(manifest.app_id.clone()) {
                    continue;
                }
                let api_dir = dlcpwn_file_ops::find_api_directory(&install_dir, &self.api_files);
                games.push(Game {
                    id: manifest.app_id,
                    name: manifest.name,
                    platform: Platform::Steam,
                    install_dir,
                    api_dir,
                    branch: Some(manifest.branch),
                });
            }
        }

        games.sort_by_key(|g| g.name.to_lowercase());
        info!(count = games.len(), "steam games found");
        games
    }
}

impl GameCatalog for SteamLibrary {
    fn get_games(&self) -> Pin<Box<dyn Future<Output = Vec<Game>> + Send + '_>> {
        Box::pin(async move { self.scan() })
    }
}
