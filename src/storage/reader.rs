//! Storage reader with strict corruption detection
//!
//! Every read validates the record checksum. The reader is used for the
//! startup scan that rebuilds the index and for point lookups by offset.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::{ItemRecord, MIN_RECORD_SIZE};

/// Storage reader for sequential scans and offset lookups.
pub struct StorageReader {
    storage_path: PathBuf,
    reader: BufReader<File>,
    current_offset: u64,
    file_size: u64,
}

impl StorageReader {
    /// Opens the table file for reading.
    pub fn open(storage_path: &Path) -> StorageResult<Self> {
        let file = File::open(storage_path).map_err(|e| {
            StorageError::read_failed(
                format!("Failed to open table file: {}", storage_path.display()),
                e,
            )
        })?;

        let file_size = file
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read file metadata", e))?
            .len();

        Ok(Self {
            storage_path: storage_path.to_path_buf(),
            reader: BufReader::new(file),
            current_offset: 0,
            file_size,
        })
    }

    /// Opens the table file inside a data directory.
    pub fn open_from_data_dir(data_dir: &Path) -> StorageResult<Self> {
        Self::open(&super::table_path(data_dir))
    }

    /// Returns the table file path.
    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Re-reads the file size so records appended since open are visible.
    pub fn refresh(&mut self) -> StorageResult<()> {
        self.file_size = self
            .reader
            .get_ref()
            .metadata()
            .map_err(|e| StorageError::read_failed("Failed to read file metadata", e))?
            .len();
        Ok(())
    }

    /// Reads the next record.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if a record was read
    /// - `Ok(None)` at end of file
    /// - `Err(ITEM_DATA_CORRUPTION)` on framing or checksum failure
    pub fn read_next(&mut self) -> StorageResult<Option<ItemRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        let min_size = MIN_RECORD_SIZE as u64;

        if remaining < min_size {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated table: {} bytes remaining, minimum record size is {}",
                    remaining, min_size
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < min_size {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if record_length > remaining {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Record length {} exceeds remaining file size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);

        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, consumed) = ItemRecord::deserialize(&record_buf)
            .map_err(|e| StorageError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += consumed as u64;

        Ok(Some(record))
    }

    /// Reads all records from the current offset to end of file.
    pub fn read_all(&mut self) -> StorageResult<Vec<ItemRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Seeks to a specific offset in the file.
    pub fn seek_to(&mut self, offset: u64) -> StorageResult<()> {
        self.reader.seek(SeekFrom::Start(offset)).map_err(|e| {
            StorageError::read_failed(format!("Failed to seek to offset {}", offset), e)
        })?;
        self.current_offset = offset;
        Ok(())
    }

    /// Reads a single record at the specified offset.
    pub fn read_at(&mut self, offset: u64) -> StorageResult<ItemRecord> {
        self.refresh()?;
        self.seek_to(offset)?;
        match self.read_next()? {
            Some(record) => Ok(record),
            None => Err(StorageError::corruption_at_offset(
                offset,
                "No record at specified offset",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageWriter;
    use tempfile::TempDir;

    #[test]
    fn test_read_at_sees_appends_after_open() {
        let temp = TempDir::new().unwrap();
        let mut writer = StorageWriter::open(temp.path()).unwrap();
        writer.write(&ItemRecord::live(1, b"{}".to_vec())).unwrap();

        let mut reader = StorageReader::open_from_data_dir(temp.path()).unwrap();
        let offset = writer.write(&ItemRecord::live(2, b"{}".to_vec())).unwrap();

        let record = reader.read_at(offset).unwrap();
        assert_eq!(record.id, 2);
    }

    #[test]
    fn test_read_all_in_file_order() {
        let temp = TempDir::new().unwrap();
        let mut writer = StorageWriter::open(temp.path()).unwrap();
        writer.write(&ItemRecord::live(1, b"{}".to_vec())).unwrap();
        writer.write(&ItemRecord::tombstone(1)).unwrap();

        let mut reader = StorageReader::open_from_data_dir(temp.path()).unwrap();
        let records = reader.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].is_tombstone);
        assert!(records[1].is_tombstone);
    }

    #[test]
    fn test_read_at_past_end_is_corruption() {
        let temp = TempDir::new().unwrap();
        let _writer = StorageWriter::open(temp.path()).unwrap();

        let mut reader = StorageReader::open_from_data_dir(temp.path()).unwrap();
        let err = reader.read_at(0).unwrap_err();
        assert!(err.is_fatal());
    }
}
