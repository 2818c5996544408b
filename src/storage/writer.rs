//! Storage writer with fsync enforcement
//!
//! The table is append-only with no in-place updates. Every write is
//! fsynced before it is acknowledged. Updates append a new live record,
//! deletes append a tombstone; the latest record for an id wins.
//!
//! A failed append is rolled back by truncating the file to the last
//! acknowledged offset, so partial bytes never precede the next record.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::reader::StorageReader;
use super::record::ItemRecord;
use crate::observability::Logger;

/// Storage writer that maintains the items.dat file.
pub struct StorageWriter {
    storage_path: PathBuf,
    file: File,
    current_offset: u64,
    /// Live item id -> offset of its latest record, ordered by id
    item_offsets: BTreeMap<i64, u64>,
    /// Highest id ever written, tombstones included
    max_id: i64,
    /// Set when a failed append may have left bytes past `current_offset`
    tail_dirty: bool,
    #[cfg(test)]
    injected_fault: Option<WriteFault>,
}

impl StorageWriter {
    /// Opens or creates the table file in the specified data directory.
    ///
    /// Creates `<data_dir>/items.dat` and any missing parent directories.
    ///
    /// # Errors
    ///
    /// Returns `ITEM_STORAGE_WRITE_FAILED` if the file cannot be created or
    /// opened, and `ITEM_DATA_CORRUPTION` if the existing table fails its
    /// startup scan.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let storage_path = super::table_path(data_dir);

        if !data_dir.exists() {
            fs::create_dir_all(data_dir).map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to create data directory: {}", data_dir.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&storage_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open table file: {}", storage_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::write_failed("Failed to read file metadata", e))?
            .len();

        let (item_offsets, max_id) = Self::build_offset_index(&storage_path, current_offset)?;

        Ok(Self {
            storage_path,
            file,
            current_offset,
            item_offsets,
            max_id,
            tail_dirty: false,
            #[cfg(test)]
            injected_fault: None,
        })
    }

    /// Scans the table to rebuild the live index and the id high-water mark.
    fn build_offset_index(
        storage_path: &Path,
        file_len: u64,
    ) -> StorageResult<(BTreeMap<i64, u64>, i64)> {
        let mut offsets = BTreeMap::new();
        let mut max_id = 0;

        if file_len == 0 {
            return Ok((offsets, max_id));
        }

        let mut reader = StorageReader::open(storage_path)?;
        loop {
            let offset = reader.current_offset();
            match reader.read_next()? {
                Some(record) => {
                    max_id = max_id.max(record.id);
                    if record.is_tombstone {
                        offsets.remove(&record.id);
                    } else {
                        offsets.insert(record.id, offset);
                    }
                }
                None => break,
            }
        }

        Ok((offsets, max_id))
    }

    /// Returns the path to the table file.
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Returns the current file offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Returns the number of live items.
    pub fn item_count(&self) -> usize {
        self.item_offsets.len()
    }

    /// Returns the id the next insert should use.
    pub fn next_id(&self) -> i64 {
        self.max_id + 1
    }

    /// Writes a record with fsync enforcement and returns its offset.
    ///
    /// # Errors
    ///
    /// Returns `ITEM_STORAGE_WRITE_FAILED` if write or fsync fails. The
    /// file is truncated back to its previous length before returning, and
    /// the writer stays usable. Returns `ITEM_STORAGE_IO_ERROR` if bytes from
    /// an earlier failed append still cannot be discarded.
    pub fn write(&mut self, record: &ItemRecord) -> StorageResult<u64> {
        if self.tail_dirty {
            self.discard_unacknowledged_tail()?;
        }

        let serialized = record.serialize();
        let offset = self.current_offset;

        if let Err(err) = self.append(&serialized, record.id) {
            self.tail_dirty = true;
            if let Err(rollback) = self.discard_unacknowledged_tail() {
                Logger::error(
                    "STORAGE_ROLLBACK_FAILED",
                    &[
                        ("code", rollback.code().code()),
                        ("message", rollback.message()),
                        ("offset", &offset.to_string()),
                    ],
                );
            }
            return Err(err);
        }

        self.current_offset += serialized.len() as u64;
        self.max_id = self.max_id.max(record.id);

        if record.is_tombstone {
            self.item_offsets.remove(&record.id);
        } else {
            self.item_offsets.insert(record.id, offset);
        }

        Ok(offset)
    }

    fn append(&mut self, bytes: &[u8], id: i64) -> StorageResult<()> {
        #[cfg(test)]
        if let Some(fault) = self.injected_fault.take() {
            return fault.apply(&mut self.file, bytes, id);
        }

        self.file.write_all(bytes).map_err(|e| {
            StorageError::write_failed(format!("Failed to write item: {}", id), e)
        })?;

        self.file.sync_all().map_err(|e| {
            StorageError::write_failed(format!("fsync failed after writing item: {}", id), e)
        })
    }

    /// Truncates anything past the last acknowledged record.
    fn discard_unacknowledged_tail(&mut self) -> StorageResult<()> {
        let len = self
            .file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read file metadata", e))?
            .len();

        if len > self.current_offset {
            self.file
                .set_len(self.current_offset)
                .and_then(|()| self.file.sync_all())
                .map_err(|e| {
                    StorageError::io_error(
                        format!("Failed to truncate table to offset {}", self.current_offset),
                        e,
                    )
                })?;

            Logger::warn(
                "STORAGE_TAIL_DISCARDED",
                &[
                    ("bytes", &(len - self.current_offset).to_string()),
                    ("offset", &self.current_offset.to_string()),
                ],
            );
        }

        self.tail_dirty = false;
        Ok(())
    }

    /// Makes the next append fail the way `fault` describes.
    #[cfg(test)]
    pub(crate) fn inject_fault(&mut self, fault: WriteFault) {
        self.injected_fault = Some(fault);
    }

    /// Writes a tombstone record for an item.
    pub fn write_tombstone(&mut self, id: i64) -> StorageResult<u64> {
        self.write(&ItemRecord::tombstone(id))
    }

    /// Returns the offset of an item's latest record, if it is live.
    pub fn get_item_offset(&self, id: i64) -> Option<u64> {
        self.item_offsets.get(&id).copied()
    }

    /// Returns offsets of live items in ascending id order, after skipping
    /// `skip` items and taking at most `limit`.
    pub fn page_offsets(&self, skip: usize, limit: usize) -> Vec<(i64, u64)> {
        self.item_offsets
            .iter()
            .skip(skip)
            .take(limit)
            .map(|(id, offset)| (*id, *offset))
            .collect()
    }
}

/// Append failures that tests can force on a writer.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteFault {
    /// Only the first half of the record reaches the file
    ShortWrite,
    /// The whole record reaches the file but fsync fails
    SyncFailure,
}

#[cfg(test)]
impl WriteFault {
    fn apply(self, file: &mut File, bytes: &[u8], id: i64) -> StorageResult<()> {
        let (landed, stage) = match self {
            WriteFault::ShortWrite => (&bytes[..bytes.len() / 2], "write"),
            WriteFault::SyncFailure => (bytes, "fsync"),
        };
        file.write_all(landed)
            .map_err(|e| StorageError::write_failed("Failed to write partial record", e))?;
        Err(StorageError::write_failed(
            format!("Injected {} failure for item: {}", stage, id),
            std::io::Error::new(std::io::ErrorKind::Other, "injected fault"),
        ))
    }
}
