//! Epic game catalog built from launcher manifests.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use dlcpwn_model::{Game, GameCatalog, Platform};
use tracing::{info, warn};

use crate::manifest::ItemManifest;

/// Game catalog backed by the Epic Games Launcher manifest directory.
pub struct EpicLibrary {
    manifests_dir: Option<PathBuf>,
    api_files: Vec<String>,
}

impl EpicLibrary {
    /// Creates a catalog over `manifests_dir`, locating API directories by `api_files`.
    pub fn new(manifests_dir: Option<PathBuf>, api_files: Vec<String>) -> Self {
        Self {
            manifests_dir,
            api_files,
        }
    }

    /// Creates a catalog over the launcher's registered manifest directory.
    pub fn detect(api_files: Vec<String>) -> Self {
        let dir = match crate::paths::manifests_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!(error = %e, "epic games launcher not detected");
                None
            }
        };
        Self::new(dir, api_files)
    }

    /// Reads every manifest and resolves each game's API directory.
    ///
    /// Malformed manifests are skipped; duplicate namespaces keep their
    /// first occurrence in file-name order.
    pub fn scan(&self) -> Vec<Game> {
        let Some(dir) = &self.manifests_dir else {
            return Vec::new();
        };
        let Ok(entries) = std::fs::read_dir(dir) else {
            warn!(dir = %dir.display(), "cannot read epic manifest directory");
            return Vec::new();
        };

        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "item"))
            .collect();
        files.sort();

        let mut seen = HashSet::new();
        let mut games = Vec::new();
        for file in files {
            let manifest = match ItemManifest::load(&file) {
                Ok(m) => m,
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "skipping epic manifest");
                    continue;
                }
            };
            if !manifest.is_game() || !seen.insert(manifest.catalog_namespace.clone()) {
                continue;
            }

            let install_dir = manifest.install_dir();
            let api_dir = dlcpwn_file_ops::find_api_directory(&install_dir, &self.api_files);
            games.push(Game {
                id: manifest.catalog_namespace,
                name: manifest.display_name,
                platform: Platform::Epic,
                install_dir,
                api_dir,
                branch: None,
            });
        }

        info!(count = games.len(), "epic games found");
        games
    }
}

impl GameCatalog for EpicLibrary {
    fn get_games(&self) -> Pin<Box<dyn Future<Output = Vec<Game>> + Send + '_>> {
        Box::pin(async move { self.scan() })
    }
}
