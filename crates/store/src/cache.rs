//! Read-through disk cache for storefront responses.
//!
//! Each lookup is stored as `<dir>/<key>.json`. The directory is created on
//! first write.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

/// A directory of cached JSON documents keyed by storefront id.
#[derive(Debug, Clone)]
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file backing `key`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` are replaced with `_` so a key
    /// can never escape the cache directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let safe = safe.trim_start_matches('.');
        self.dir.join(format!("{safe}.json"))
    }

    /// Returns the cached document for `key`.
    ///
    /// A file that is not valid JSON is deleted and reported as a miss.
    pub fn load(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(value) => {
                debug!(key, "cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding corrupt cache file");
                let _ = std::fs::remove_file(&path);
                None
            }
        }
    }

    /// Deletes the entry for `key`, if any.
    pub fn remove(&self, key: &str) {
        let path = self.path_for(key);
        if let Err(e) = dlcpwn_file_ops::remove_if_exists(&path) {
            warn!(path = %path.display(), error = %e, "failed to remove cache file");
        }
    }

    /// Stores `value` under `key`. Failures are logged and otherwise ignored.
    pub fn store(&self, key: &str, value: &Value) {
        let path = self.path_for(key);
        let result = std::fs::create_dir_all(&self.dir).and_then(|()| {
            let body = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
            dlcpwn_file_ops::write_atomic(&path, &body)
        });
        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "failed to write cache file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(tmp.path().join("app_info"));

        assert!(cache.load("480").is_none());
        cache.store("480", &json!({"name": "Spacewar"}));

        assert!(tmp.path().join("app_info").join("480.json").exists());
        assert_eq!(cache.load("480").unwrap()["name"], "Spacewar");
    }

    #[test]
    fn corrupt_file_is_deleted() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(tmp.path());
        let path = cache.path_for("bad");
        std::fs::write(&path, "{ truncated").unwrap();

        assert!(cache.load("bad").is_none());
        assert!(!path.exists());
    }

    #[test]
    fn keys_cannot_escape_directory() {
        let cache = JsonCache::new("/cache");
        assert_eq!(cache.path_for("../etc/passwd"), PathBuf::from("/cache/_etc_passwd.json"));
        assert_eq!(cache.path_for("a b/c"), PathBuf::from("/cache/a_b_c.json"));
        assert_eq!(cache.path_for("epic_ns-1"), PathBuf::from("/cache/epic_ns-1.json"));
    }

    #[test]
    fn unwritable_directory_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let cache = JsonCache::new(&blocker);
        cache.store("1", &json!(1));
        assert!(cache.load("1").is_none());
    }
}
