use std::path::PathBuf;

use winreg::RegKey;
use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};

use crate::EpicError;
use crate::paths::{expand_env_vars, manifests_from_app_data};

/// Returns the manifest directory using the registry.
pub(crate) fn manifests_dir() -> Result<PathBuf, EpicError> {
    if let Some(path) = read_value(
        &RegKey::predef(HKEY_CURRENT_USER),
        r"Software\Epic Games\EOS",
        "ModSdkMetadataDir",
    ) {
        return Ok(PathBuf::from(expand_env_vars(&path)));
    }

    if let Some(path) = read_value(
        &RegKey::predef(HKEY_LOCAL_MACHINE),
        r"SOFTWARE\Epic Games\EpicGamesLauncher",
        "AppDataPath",
    ) {
        return Ok(manifests_from_app_data(&path));
    }

    Err(EpicError::NotFound)
}

fn read_value(root: &RegKey, subkey: &str, value: &str) -> Option<String> {
    let key = root.open_subkey(subkey).ok()?;
    let path: String = key.get_value(value).ok()?;
    (!path.is_empty()).then_some(path)
}
