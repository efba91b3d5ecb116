//! Patch engine for storefront DLC-unlocker shims.
//!
//! A [`PatchVariant`] describes one shim: which API binaries it replaces,
//! its configuration payload format and its toggles. [`PatchEngine`] applies
//! a variant to a game's API directory, keeping each original binary next to
//! the shim as `<name>_o.<ext>` so uninstall can restore it.

pub mod cream;
pub mod engine;
pub mod error;
pub mod journal;
pub mod scream;
pub mod variant;

pub use cream::CreamApi;
pub use engine::{InstallReport, PatchEngine};
pub use error::PatchError;
pub use journal::Journal;
pub use scream::ScreamApi;
pub use variant::{BinarySlot, DlcEntry, PatchVariant, SavedConfig, Settings, Toggle};
