//! Filesystem primitives for locating and swapping storefront API binaries.
//!
//! Provides the breadth-first API directory search used by the game
//! catalogs, plus the backup-pair naming, metadata-preserving copy and
//! atomic replace helpers the patch engine builds its transactions from.

mod locate;
mod swap;

pub use locate::find_api_directory;
pub use swap::{
    BACKUP_SUFFIX, STAGING_SUFFIX, backup_name, copy_preserving, remove_if_exists, staging_path,
    write_atomic,
};
