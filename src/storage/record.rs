//! Item record types
//!
//! On-disk record format:
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Item ID          | (i64 LE)
//! +------------------+
//! | Tombstone Flag   | (u8: 0 = live, 1 = deleted)
//! +------------------+
//! | Item Body        | (length-prefixed JSON bytes)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Read};

/// len + id + tombstone + body length + checksum
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 8 + 1 + 4 + 4;

/// Complete item record as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Storage-assigned item identifier
    pub id: i64,
    /// Whether this record deletes the item
    pub is_tombstone: bool,
    /// JSON encoding of the item fields (empty for tombstones)
    pub body: Vec<u8>,
}

impl ItemRecord {
    /// Create a record for a live item
    pub fn live(id: i64, body: Vec<u8>) -> Self {
        Self {
            id,
            is_tombstone: false,
            body,
        }
    }

    /// Create a tombstone record for a deleted item
    pub fn tombstone(id: i64) -> Self {
        Self {
            id,
            is_tombstone: true,
            body: Vec::new(),
        }
    }

    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + 1 + 4 + self.body.len());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.push(if self.is_tombstone { 1 } else { 0 });
        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);
        buf
    }

    /// Serialize the complete record to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = super::checksum::compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);

        if !super::checksum::verify_checksum(&data[0..checksum_offset], stored_checksum) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    super::checksum::compute_checksum(&data[0..checksum_offset]),
                    stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        let mut id_buf = [0u8; 8];
        cursor.read_exact(&mut id_buf)?;
        let id = i64::from_le_bytes(id_buf);

        let mut tombstone_buf = [0u8; 1];
        cursor.read_exact(&mut tombstone_buf)?;
        let is_tombstone = tombstone_buf[0] != 0;

        let mut len_buf = [0u8; 4];
        cursor.read_exact(&mut len_buf)?;
        let body_len = u32::from_le_bytes(len_buf) as usize;

        if body_len != checksum_offset - 4 - 8 - 1 - 4 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Body length {} does not match record framing", body_len),
            ));
        }

        let mut body = vec![0u8; body_len];
        cursor.read_exact(&mut body)?;

        Ok((
            Self {
                id,
                is_tombstone,
                body,
            },
            record_length,
        ))
    }
}
