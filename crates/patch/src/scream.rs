//! ScreamAPI: Epic Online Services shim configured through `ScreamAPI.json`.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::error::PatchError;
use crate::variant::{BinarySlot, DlcEntry, PatchVariant, SavedConfig, Settings, Toggle};

static SLOTS: [BinarySlot; 2] = [
    BinarySlot {
        label: "32-bit",
        live: "EOSSDK-Win32-Shipping.dll",
    },
    BinarySlot {
        label: "64-bit",
        live: "EOSSDK-Win64-Shipping.dll",
    },
];

static TOGGLES: [Toggle; 5] = [
    Toggle {
        key: "logging",
        label: "Logging",
        default: true,
    },
    Toggle {
        key: "eos_logging",
        label: "EOS SDK Logging",
        default: false,
    },
    Toggle {
        key: "block_metrics",
        label: "Block Metrics",
        default: false,
    },
    Toggle {
        key: "unlock_all",
        label: "Unlock All Items",
        default: false,
    },
    Toggle {
        key: "auto_inject",
        label: "Auto-Inject Entitlements",
        default: false,
    },
];

const CONFIG_VERSION: u32 = 2;

#[derive(Serialize)]
struct ScreamConfig<'a> {
    version: u32,
    logging: bool,
    eos_logging: bool,
    block_metrics: bool,
    catalog_items: CatalogItems<'a>,
    entitlements: Entitlements,
}

#[derive(Serialize)]
struct CatalogItems<'a> {
    unlock_all: bool,
    #[serde(rename = "override")]
    override_items: Vec<&'a str>,
}

#[derive(Serialize)]
struct Entitlements {
    unlock_all: bool,
    auto_inject: bool,
    inject: Vec<String>,
}

/// ScreamAPI variant.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreamApi;

impl PatchVariant for ScreamApi {
    fn name(&self) -> &'static str {
        "ScreamAPI"
    }

    fn payload_subdir(&self) -> &'static str {
        "scream_api"
    }

    fn slots(&self) -> &'static [BinarySlot] {
        &SLOTS
    }

    fn config_file_name(&self) -> &'static str {
        "ScreamAPI.json"
    }

    fn toggles(&self) -> &'static [Toggle] {
        &TOGGLES
    }

    fn wants_dlc_names(&self) -> bool {
        false
    }

    fn render_payload(
        &self,
        _game_id: &str,
        dlcs: &[DlcEntry],
        settings: &Settings,
    ) -> Result<String, PatchError> {
        let unlock_all = settings.get("unlock_all");
        let config = ScreamConfig {
            version: CONFIG_VERSION,
            logging: settings.get("logging"),
            eos_logging: settings.get("eos_logging"),
            block_metrics: settings.get("block_metrics"),
            catalog_items: CatalogItems {
                unlock_all,
                override_items: dlcs.iter().map(|d| d.id.as_str()).collect(),
            },
            entitlements: Entitlements {
                unlock_all,
                auto_inject: settings.get("auto_inject"),
                inject: Vec::new(),
            },
        };

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        config.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn parse_payload(&self, content: &str) -> SavedConfig {
        let mut settings = self.default_settings();
        let mut dlcs = BTreeSet::new();

        let Ok(root) = serde_json::from_str::<Value>(content) else {
            return SavedConfig { settings, dlcs };
        };

        let flag = |path: &[&str]| {
            path.iter()
                .try_fold(&root, |v, key| v.get(key))
                .and_then(Value::as_bool)
        };
        for (key, path) in [
            ("logging", &["logging"][..]),
            ("eos_logging", &["eos_logging"][..]),
            ("block_metrics", &["block_metrics"][..]),
            ("unlock_all", &["catalog_items", "unlock_all"][..]),
            ("auto_inject", &["entitlements", "auto_inject"][..]),
        ] {
            if let Some(value) = flag(path) {
                settings.set(key, value);
            }
        }

        if let Some(items) = root
            .get("catalog_items")
            .and_then(|c| c.get("override"))
            .and_then(Value::as_array)
        {
            dlcs.extend(items.iter().filter_map(Value::as_str).map(str::to_string));
        }

        SavedConfig { settings, dlcs }
    }
}
