use std::path::PathBuf;

use crate::EpicError;

/// Returns the launcher's manifest directory.
#[cfg(target_os = "windows")]
pub fn manifests_dir() -> Result<PathBuf, EpicError> {
    crate::paths_windows::manifests_dir()
}

/// Returns the launcher's manifest directory.
///
/// The launcher only exists on Windows; elsewhere the directory must be
/// configured explicitly.
#[cfg(not(target_os = "windows"))]
pub fn manifests_dir() -> Result<PathBuf, EpicError> {
    Err(EpicError::NotFound)
}

/// Expands `%NAME%` environment references.
///
/// Unknown variables and unmatched `%` are left untouched.
pub fn expand_env_vars(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok())
}

fn expand_with(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            _ => {
                out.push('%');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Appends `Manifests` to a launcher `AppDataPath` that ends in `Data`.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) fn manifests_from_app_data(app_data: &str) -> PathBuf {
    let trimmed = app_data.trim_end_matches(['\\', '/']);
    let expanded = PathBuf::from(expand_env_vars(trimmed));
    if trimmed.rsplit(['\\', '/']).next() == Some("Data") {
        expanded.join("Manifests")
    } else {
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "PROGRAMDATA" => Some("C:\\ProgramData".into()),
            "USER" => Some("gamer".into()),
            _ => None,
        }
    }

    #[test]
    fn expands_known_variables() {
        assert_eq!(
            expand_with("%PROGRAMDATA%\\Epic", lookup),
            "C:\\ProgramData\\Epic"
        );
        assert_eq!(expand_with("a-%USER%-%USER%", lookup), "a-gamer-gamer");
    }

    #[test]
    fn leaves_unknown_and_unmatched() {
        assert_eq!(expand_with("%NOPE%\\x", lookup), "%NOPE%\\x");
        assert_eq!(expand_with("100%", lookup), "100%");
        assert_eq!(expand_with("%%USER%", lookup), "%gamer");
        assert_eq!(expand_with("plain", lookup), "plain");
    }

    #[test]
    fn app_data_gets_manifests_suffix() {
        assert_eq!(
            manifests_from_app_data("/ProgramData/Epic/EpicGamesLauncher/Data"),
            PathBuf::from("/ProgramData/Epic/EpicGamesLauncher/Data").join("Manifests")
        );
        assert_eq!(
            manifests_from_app_data("/ProgramData/Epic/MyData"),
            PathBuf::from("/ProgramData/Epic/MyData")
        );
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn manifests_dir_not_detected_off_windows() {
        assert!(matches!(manifests_dir(), Err(EpicError::NotFound)));
    }
}
