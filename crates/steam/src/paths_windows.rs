use std::path::PathBuf;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

use crate::SteamError;

/// Returns the Steam base directory on Windows using the registry.
pub(crate) fn get_base_dir() -> Result<PathBuf, SteamError> {
    // Per-user key written by the client itself.
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    if let Ok(path) = read_registry(&hkcu, r"Software\Valve\Steam", "SteamPath") {
        return Ok(path);
    }

    // Machine-wide install key, 64-bit view first.
    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    for subkey in [r"SOFTWARE\Wow6432Node\Valve\Steam", r"SOFTWARE\Valve\Steam"] {
        if let Ok(path) = read_registry(&hklm, subkey, "InstallPath") {
            return Ok(path);
        }
    }

    Err(SteamError::NotFound)
}

fn read_registry(root: &RegKey, subkey: &str, value: &str) -> Result<PathBuf, SteamError> {
    let key = root.open_subkey(subkey).map_err(|_| SteamError::NotFound)?;
    let path: String = key.get_value(value).map_err(|_| SteamError::NotFound)?;
    if path.is_empty() {
        return Err(SteamError::NotFound);
    }
    Ok(PathBuf::from(path))
}
