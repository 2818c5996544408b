//! Item storage subsystem
//!
//! The storage engine holds the persistent table of item records.
//! It is an append-only record file with no in-place updates.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates)
//! - Checksum-verified on every read
//! - Tombstones preserved, so ids are never reused
//! - Latest record wins for the same item id
//! - fsync before acknowledging any write

use std::path::{Path, PathBuf};

mod checksum;
mod errors;
mod reader;
mod record;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{Severity, StorageError, StorageErrorCode, StorageResult};
pub use reader::StorageReader;
pub use record::ItemRecord;
pub use writer::StorageWriter;
#[cfg(test)]
pub(crate) use writer::WriteFault;

/// File name of the item table inside the data directory
pub const TABLE_FILE: &str = "items.dat";

/// Returns the path of the item table for a data directory.
pub fn table_path(data_dir: &Path) -> PathBuf {
    data_dir.join(TABLE_FILE)
}
