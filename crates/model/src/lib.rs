//! Shared domain types for dlcpwn.
//!
//! Game records and DLC metadata flow from the storefront catalogs
//! (`dlcpwn-steam`, `dlcpwn-epic`) and metadata providers (`dlcpwn-store`)
//! into the patch engine (`dlcpwn-patch`). The collaborator traits live here
//! so each side can be mocked independently.

pub mod catalog;
pub mod types;

// Re-export primary types for convenience.
pub use catalog::{GameCatalog, MetadataProvider};
pub use types::{DlcInfo, Game, Platform};
