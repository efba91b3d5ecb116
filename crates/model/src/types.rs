use std::fmt;
use std::path::PathBuf;

/// Storefront a game was installed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Steam,
    Epic,
}

impl Platform {
    /// Label used when printing a game's identifier.
    pub fn id_label(&self) -> &'static str {
        match self {
            Platform::Steam => "AppID",
            Platform::Epic => "ID",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Steam => write!(f, "Steam"),
            Platform::Epic => write!(f, "Epic"),
        }
    }
}

/// An installed game discovered by a catalog.
///
/// Built fresh on every run. Whether a patch is installed is not stored
/// here: it is derived from the files in `api_dir` on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    /// Steam app id or Epic catalog namespace.
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub install_dir: PathBuf,
    /// Directory holding the storefront API binaries, `None` when unsupported.
    pub api_dir: Option<PathBuf>,
    /// Steam beta branch, `None` for Epic games.
    pub branch: Option<String>,
}

impl Game {
    /// Returns true if the storefront API directory was found.
    pub fn is_supported(&self) -> bool {
        self.api_dir.is_some()
    }
}

/// Metadata about a single DLC from a storefront catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlcInfo {
    pub id: String,
    pub name: String,
    /// Id of the base game, when the catalog reports it.
    pub parent_id: Option<String>,
}
