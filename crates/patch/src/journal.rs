//! Install journal.
//!
//! Written before the first rename of an install and removed once every
//! rename has landed. A journal left on disk means an install was cut short;
//! uninstall uses it to repair the directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PatchError;

pub const JOURNAL_FILE: &str = ".dlcpwn-journal.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Live binary names being swapped.
    pub slots: Vec<String>,
}

impl Journal {
    pub fn path(dir: &Path) -> PathBuf {
        dir.join(JOURNAL_FILE)
    }

    pub fn exists(dir: &Path) -> bool {
        Self::path(dir).is_file()
    }

    /// Reads the journal in `dir`, `None` when absent or unreadable.
    pub fn load(dir: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(Self::path(dir)).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn write(&self, dir: &Path) -> Result<(), PatchError> {
        let body = serde_json::to_vec_pretty(self)?;
        dlcpwn_file_ops::write_atomic(&Self::path(dir), &body)?;
        Ok(())
    }

    pub fn remove(dir: &Path) -> std::io::Result<bool> {
        dlcpwn_file_ops::remove_if_exists(&Self::path(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_load_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let journal = Journal {
            slots: vec!["steam_api64.dll".into()],
        };

        assert!(!Journal::exists(tmp.path()));
        journal.write(tmp.path()).unwrap();
        assert!(Journal::exists(tmp.path()));
        assert_eq!(Journal::load(tmp.path()), Some(journal));

        assert!(Journal::remove(tmp.path()).unwrap());
        assert!(!Journal::remove(tmp.path()).unwrap());
    }

    #[test]
    fn unreadable_journal_still_counts() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(Journal::path(tmp.path()), "garbage").unwrap();
        assert!(Journal::exists(tmp.path()));
        assert!(Journal::load(tmp.path()).is_none());
    }
}
