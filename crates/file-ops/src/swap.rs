//! Backup-pair naming and crash-tolerant file replacement.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix inserted before the extension of a backed-up binary.
pub const BACKUP_SUFFIX: &str = "_o";

/// Suffix appended to files staged next to their final path.
pub const STAGING_SUFFIX: &str = ".dlcpwn-staged";

/// Returns the backup file name for a live binary name.
///
/// `steam_api64.dll` becomes `steam_api64_o.dll`; names without an
/// extension get the suffix appended.
pub fn backup_name(live_name: &str) -> String {
    match live_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{BACKUP_SUFFIX}.{ext}"),
        _ => format!("{live_name}{BACKUP_SUFFIX}"),
    }
}

/// Returns the staging path used while preparing `path`.
///
/// Staged files live in the same directory as their target so the final
/// rename never crosses a volume.
pub fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(STAGING_SUFFIX);
    path.with_file_name(name)
}

/// Copies `src` to `dst`, keeping permissions and modification time.
pub fn copy_preserving(src: &Path, dst: &Path) -> io::Result<u64> {
    let bytes = fs::copy(src, dst)?;
    let modified = fs::metadata(src)?.modified()?;
    fs::OpenOptions::new()
        .write(true)
        .open(dst)?
        .set_modified(modified)?;
    Ok(bytes)
}

/// Replaces `path` with `contents` through a staged file and a rename.
///
/// Readers observe either the old file or the complete new one.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let staged = staging_path(path);
    if let Err(e) = fs::write(&staged, contents) {
        let _ = fs::remove_file(&staged);
        return Err(e);
    }
    fs::rename(&staged, path).inspect_err(|_| {
        let _ = fs::remove_file(&staged);
    })
}

/// Removes a file, treating "not found" as success.
///
/// Returns whether a file was actually removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    #[test]
    fn backup_names() {
        assert_eq!(backup_name("steam_api.dll"), "steam_api_o.dll");
        assert_eq!(backup_name("steam_api64.dll"), "steam_api64_o.dll");
        assert_eq!(
            backup_name("EOSSDK-Win64-Shipping.dll"),
            "EOSSDK-Win64-Shipping_o.dll"
        );
        assert_eq!(backup_name("libsteam_api"), "libsteam_api_o");
        assert_eq!(backup_name(".hidden"), ".hidden_o");
    }

    #[test]
    fn staging_path_stays_in_directory() {
        let staged = staging_path(Path::new("/games/bin/cream_api.ini"));
        assert_eq!(
            staged,
            PathBuf::from("/games/bin/cream_api.ini.dlcpwn-staged")
        );
    }

    #[test]
    fn copy_preserving_keeps_mtime() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src.dll");
        let dst = dir.path().join("dst.dll");
        fs::write(&src, b"payload").unwrap();

        let old = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        fs::OpenOptions::new()
            .write(true)
            .open(&src)
            .unwrap()
            .set_modified(old)
            .unwrap();

        let bytes = copy_preserving(&src, &dst).unwrap();
        assert_eq!(bytes, 7);
        assert_eq!(fs::read(&dst).unwrap(), b"payload");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), old);
    }

    #[test]
    fn copy_preserving_missing_source_fails() {
        let dir = TempDir::new().unwrap();
        let result = copy_preserving(&dir.path().join("nope"), &dir.path().join("dst"));
        assert!(result.is_err());
        assert!(!dir.path().join("dst").exists());
    }

    #[test]
    fn write_atomic_replaces_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cream_api.ini");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn write_atomic_into_missing_dir_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("cfg.json");
        assert!(write_atomic(&path, b"{}").is_err());
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn remove_if_exists_reports_removal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg");
        fs::write(&path, "x").unwrap();

        assert!(remove_if_exists(&path).unwrap());
        assert!(!remove_if_exists(&path).unwrap());
    }
}
