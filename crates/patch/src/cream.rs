//! CreamAPI: Steam shim configured through `cream_api.ini`.

use std::collections::BTreeSet;

use crate::error::PatchError;
use crate::variant::{BinarySlot, DlcEntry, PatchVariant, SavedConfig, Settings, Toggle};

static SLOTS: [BinarySlot; 2] = [
    BinarySlot {
        label: "32-bit",
        live: "steam_api.dll",
    },
    BinarySlot {
        label: "64-bit",
        live: "steam_api64.dll",
    },
];

static TOGGLES: [Toggle; 4] = [
    Toggle {
        key: "extra_protection",
        label: "Extra Protection",
        default: false,
    },
    Toggle {
        key: "force_offline",
        label: "Force Offline",
        default: false,
    },
    Toggle {
        key: "low_violence",
        label: "Low Violence",
        default: false,
    },
    Toggle {
        key: "disable_ui",
        label: "Disable Steam UI",
        default: false,
    },
];

/// Maps ini `(section, key)` pairs to toggle keys.
const INI_KEYS: [(&str, &str, &str); 4] = [
    ("steam", "extraprotection", "extra_protection"),
    ("steam", "forceoffline", "force_offline"),
    ("steam", "lowviolence", "low_violence"),
    ("steam_misc", "disableuserinterface", "disable_ui"),
];

/// CreamAPI variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreamApi;

impl PatchVariant for CreamApi {
    fn name(&self) -> &'static str {
        "CreamAPI"
    }

    fn payload_subdir(&self) -> &'static str {
        "cream_api"
    }

    fn slots(&self) -> &'static [BinarySlot] {
        &SLOTS
    }

    fn config_file_name(&self) -> &'static str {
        "cream_api.ini"
    }

    fn toggles(&self) -> &'static [Toggle] {
        &TOGGLES
    }

    fn wants_dlc_names(&self) -> bool {
        true
    }

    fn render_payload(
        &self,
        game_id: &str,
        dlcs: &[DlcEntry],
        settings: &Settings,
    ) -> Result<String, PatchError> {
        let flag = |key: &str| if settings.get(key) { "true" } else { "false" };

        let mut lines = vec![
            "[steam]".to_string(),
            format!("appid = {game_id}"),
            "unlockall = false".to_string(),
            format!("orgapi = {}", SLOTS[0].backup()),
            format!("orgapi64 = {}", SLOTS[1].backup()),
        ];
        for (section, ini_key, key) in INI_KEYS {
            if section == "steam" {
                lines.push(format!("{ini_key} = {}", flag(key)));
            }
        }
        lines.push(String::new());

        lines.push("[steam_misc]".to_string());
        for (section, ini_key, key) in INI_KEYS {
            if section == "steam_misc" {
                lines.push(format!("{ini_key} = {}", flag(key)));
            }
        }
        lines.push(String::new());

        lines.push("[dlc]".to_string());
        for dlc in dlcs {
            if let Some(name) = &dlc.name {
                let name = name.replace(['\r', '\n'], " ");
                lines.push(format!("{} = {}", dlc.id, name.trim()));
            }
        }

        Ok(lines.join("\n"))
    }

    fn parse_payload(&self, content: &str) -> SavedConfig {
        let mut settings = self.default_settings();
        let mut dlcs = BTreeSet::new();
        let mut section = String::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = name.to_lowercase();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let value = value.trim().eq_ignore_ascii_case("true");

            if section == "dlc" {
                if !key.is_empty() {
                    dlcs.insert(key);
                }
                continue;
            }
            if let Some((_, _, toggle)) = INI_KEYS
                .iter()
                .find(|(s, k, _)| *s == section && *k == key)
            {
                settings.set(toggle, value);
            }
        }

        SavedConfig { settings, dlcs }
    }
}
