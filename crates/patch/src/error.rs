//! Patch engine error types.

use std::path::PathBuf;

/// Errors produced by install, update and uninstall.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("API directory not found under {0}")]
    DirectoryNotFound(PathBuf),

    #[error("already installed in {0} (backup binaries present)")]
    AlreadyInstalled(PathBuf),

    #[error("not installed in {0}")]
    NotInstalled(PathBuf),

    #[error("no target binaries found in {0}")]
    NoTargetBinaries(PathBuf),

    #[error("patch binary missing: {0}")]
    MissingPatchBinary(PathBuf),

    #[error("an earlier install in {0} did not finish; uninstall to repair it")]
    InterruptedInstall(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
