//! Epic Games Launcher catalog.
//!
//! Installed games are described by one `.item` JSON manifest each, kept
//! in a directory the launcher records in the registry.

pub mod library;
pub mod manifest;
pub mod paths;
#[cfg(target_os = "windows")]
mod paths_windows;

pub use library::EpicLibrary;
pub use manifest::ItemManifest;
pub use paths::{expand_env_vars, manifests_dir};

/// Errors for Epic launcher operations.
#[derive(Debug, thiserror::Error)]
pub enum EpicError {
    #[error("epic games launcher manifests not found")]
    NotFound,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
