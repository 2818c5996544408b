//! Storage Integrity Tests
//!
//! The item table is append-only and checksum-verified. Corruption is
//! never ignored: it fails reads and aborts opening the store.

use std::fs;
use std::sync::Arc;

use itemstore::item::ItemCreate;
use itemstore::session::ItemStore;
use itemstore::storage::{
    table_path, ItemRecord, StorageErrorCode, StorageReader, StorageWriter,
};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn item_body(name: &str) -> Vec<u8> {
    format!(r#"{{"name":"{}","description":null,"price":1.5,"tax":null}}"#, name).into_bytes()
}

fn create_temp_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

// =============================================================================
// Corruption is never ignored
// =============================================================================

/// A flipped byte makes the record read fail with a checksum error.
#[test]
fn test_corruption_causes_explicit_failure() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut writer = StorageWriter::open(data_dir).unwrap();
        writer.write(&ItemRecord::live(1, item_body("a"))).unwrap();
    }

    let path = table_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    let mid = contents.len() / 2;
    contents[mid] ^= 0xFF;
    fs::write(&path, contents).unwrap();

    let mut reader = StorageReader::open_from_data_dir(data_dir).unwrap();
    let err = reader.read_at(0).unwrap_err();

    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
    assert!(
        err.to_string().to_lowercase().contains("checksum"),
        "Error should mention checksum, got: {}",
        err
    );
}

/// Opening a store over a corrupt table aborts instead of serving.
#[test]
fn test_corrupt_table_aborts_open() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let store = Arc::new(ItemStore::open(data_dir).unwrap());
        let session = store.session();
        session
            .create(&ItemCreate {
                name: "a".into(),
                description: None,
                price: 1.0,
                tax: None,
            })
            .unwrap();
    }

    let path = table_path(data_dir);
    let mut contents = fs::read(&path).unwrap();
    let last = contents.len() - 1;
    contents[last] ^= 0x01;
    fs::write(&path, contents).unwrap();

    match ItemStore::open(data_dir) {
        Ok(_) => panic!("corrupt table must not open"),
        Err(err) => assert!(err.is_fatal()),
    }
}

/// A partially written trailing record is detected as truncation.
#[test]
fn test_truncated_tail_detected() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut writer = StorageWriter::open(data_dir).unwrap();
        writer.write(&ItemRecord::live(1, item_body("a"))).unwrap();
        writer.write(&ItemRecord::live(2, item_body("b"))).unwrap();
    }

    let path = table_path(data_dir);
    let contents = fs::read(&path).unwrap();
    fs::write(&path, &contents[..contents.len() - 3]).unwrap();

    let err = match StorageWriter::open(data_dir) {
        Ok(_) => panic!("truncated table must not open"),
        Err(err) => err,
    };
    assert_eq!(err.code(), StorageErrorCode::DataCorruption);
}

// =============================================================================
// Reads return complete records
// =============================================================================

#[test]
fn test_every_record_verified_on_scan() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();

    {
        let mut writer = StorageWriter::open(data_dir).unwrap();
        for id in 1..=5 {
            writer
                .write(&ItemRecord::live(id, item_body(&format!("item{}", id))))
                .unwrap();
        }
    }

    let mut reader = StorageReader::open_from_data_dir(data_dir).unwrap();
    let records = reader.read_all().unwrap();
    assert_eq!(records.len(), 5);
    assert_eq!(records[4].body, item_body("item5"));
}

// =============================================================================
// Append-only semantics
// =============================================================================

/// Updates and deletes append; nothing is rewritten in place.
#[test]
fn test_updates_and_deletes_append() {
    let temp_dir = create_temp_data_dir();
    let data_dir = temp_dir.path();
    let path = table_path(data_dir);

    let mut writer = StorageWriter::open(data_dir).unwrap();
    writer.write(&ItemRecord::live(1, item_body("a"))).unwrap();
    let prefix = fs::read(&path).unwrap();

    writer.write(&ItemRecord::live(1, item_body("b"))).unwrap();
    writer.write_tombstone(1).unwrap();

    let contents = fs::read(&path).unwrap();
    assert!(contents.starts_with(&prefix));

    let records = StorageReader::open(&path).unwrap().read_all().unwrap();
    assert_eq!(records.len(), 3);
    assert!(records[2].is_tombstone);
    assert_eq!(writer.item_count(), 0);
}
