pub mod library;
pub mod paths;
#[cfg(target_os = "linux")]
pub mod paths_linux;
#[cfg(target_os = "windows")]
pub mod paths_windows;
pub mod vdf;

// Re-export primary types.
pub use library::{AppManifest, SteamLibrary};
pub use paths::Paths;
pub use vdf::{VdfValue, parse_text_vdf};

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("VDF parse error: {0}")]
    Vdf(String),

    #[error("invalid app manifest: {0}")]
    Manifest(String),

    #[error("I/O error: {0}")]
    Io(String),
}
