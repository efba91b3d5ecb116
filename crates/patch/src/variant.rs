//! Storefront-specific patch parameters.

use std::collections::BTreeSet;

use crate::error::PatchError;

/// One architecture's API binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinarySlot {
    /// Short label for operator output, e.g. `64-bit`.
    pub label: &'static str,
    /// File name of the storefront binary in the API directory.
    pub live: &'static str,
}

impl BinarySlot {
    /// File name the original binary is kept under while patched.
    pub fn backup(&self) -> String {
        dlcpwn_file_ops::backup_name(self.live)
    }
}

/// A boolean option written into the configuration payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggle {
    pub key: &'static str,
    pub label: &'static str,
    pub default: bool,
}

/// Current values for a variant's toggles, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    toggles: &'static [Toggle],
    values: Vec<bool>,
}

impl Settings {
    pub fn defaults(toggles: &'static [Toggle]) -> Self {
        Self {
            toggles,
            values: toggles.iter().map(|t| t.default).collect(),
        }
    }

    /// Returns the value of `key`, `false` for unknown keys.
    pub fn get(&self, key: &str) -> bool {
        self.position(key).is_some_and(|i| self.values[i])
    }

    /// Sets `key`. Returns false if the variant has no such toggle.
    pub fn set(&mut self, key: &str, value: bool) -> bool {
        match self.position(key) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    /// Inverts the toggle at `index`. Returns false if out of range.
    pub fn flip(&mut self, index: usize) -> bool {
        match self.values.get_mut(index) {
            Some(v) => {
                *v = !*v;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static Toggle, bool)> + '_ {
        self.toggles.iter().zip(self.values.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.toggles.iter().position(|t| t.key == key)
    }
}

/// A DLC entry handed to the payload renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DlcEntry {
    pub id: String,
    /// Display name, `None` for variants that store ids only.
    pub name: Option<String>,
}

/// Settings and DLC selection read back from an installed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedConfig {
    pub settings: Settings,
    pub dlcs: BTreeSet<String>,
}

/// File names, payload format and toggles of one storefront's shim.
pub trait PatchVariant: Send + Sync {
    /// Display name, e.g. `CreamAPI`.
    fn name(&self) -> &'static str;

    /// Subdirectory of the payload directory holding the shim binaries.
    fn payload_subdir(&self) -> &'static str;

    /// API binaries, one per architecture.
    fn slots(&self) -> &'static [BinarySlot];

    /// Configuration payload file name, written next to the binaries.
    fn config_file_name(&self) -> &'static str;

    fn toggles(&self) -> &'static [Toggle];

    /// Whether DLC entries need a resolved name.
    ///
    /// When true, selected DLCs whose metadata cannot be resolved are left
    /// out of the payload.
    fn wants_dlc_names(&self) -> bool;

    /// Renders the complete payload file contents.
    fn render_payload(
        &self,
        game_id: &str,
        dlcs: &[DlcEntry],
        settings: &Settings,
    ) -> Result<String, PatchError>;

    /// Reads settings and DLC ids back from payload contents.
    ///
    /// Never fails: unreadable input yields defaults.
    fn parse_payload(&self, content: &str) -> SavedConfig;

    fn default_settings(&self) -> Settings {
        Settings::defaults(self.toggles())
    }

    /// Live and backup binary names; these mark a directory as this
    /// variant's API directory.
    fn binary_names(&self) -> Vec<String> {
        self.slots()
            .iter()
            .flat_map(|slot| [slot.live.to_string(), slot.backup()])
            .collect()
    }
}
