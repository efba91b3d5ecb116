//! Breadth-first search for the directory holding storefront API binaries.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::debug;

/// Returns the directory closest to `root` that directly contains any of
/// `targets`.
///
/// Directories are visited in breadth-first order, so the first match is
/// always one of minimum depth. Siblings at the same depth are visited in
/// name order. Directories that cannot be listed are skipped. Every
/// directory is visited at most once, keyed by its canonical path, so
/// symlink cycles terminate. File names compare ASCII case-insensitively.
///
/// Returns `None` when `root` is not a directory or nothing matches.
pub fn find_api_directory<S: AsRef<str>>(root: &Path, targets: &[S]) -> Option<PathBuf> {
    if !root.is_dir() {
        return None;
    }

    let targets: HashSet<String> = targets
        .iter()
        .map(|t| {
            let t = t.as_ref();
            Path::new(t)
                .file_name()
                .map(|n| n.to_string_lossy().to_ascii_lowercase())
                .unwrap_or_else(|| t.to_ascii_lowercase())
        })
        .collect();

    let mut queue = VecDeque::from([(root.to_path_buf(), 0usize)]);
    let mut visited = HashSet::from([visit_key(root)]);

    while let Some((dir, depth)) = queue.pop_front() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                continue;
            }
        };

        let mut children = Vec::new();
        let mut matched = false;
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            if targets.contains(&name) {
                matched = true;
                break;
            }
            children.push(entry.path());
        }

        if matched {
            debug!(dir = %dir.display(), depth, "found API directory");
            return Some(dir);
        }

        children.sort();
        for child in children {
            if child.is_dir() && visited.insert(visit_key(&child)) {
                queue.push_back((child, depth + 1));
            }
        }
    }

    None
}

fn visit_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
