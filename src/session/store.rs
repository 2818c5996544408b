//! Item store handle
//!
//! `ItemStore` owns the table writer and a reader behind one mutex. Every
//! storage operation runs inside a single critical section and is fsynced
//! before it returns, so each call auto-commits. Nothing holds the lock
//! across operations.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::guard::Session;
use crate::item::{Item, ItemCreate, ListParams};
use crate::observability::Logger;
use crate::storage::{ItemRecord, StorageError, StorageReader, StorageResult, StorageWriter};

/// Explicitly constructed storage handle, shared by all requests.
pub struct ItemStore {
    data_dir: PathBuf,
    inner: Mutex<StoreInner>,
    open_sessions: AtomicUsize,
}

pub(super) struct StoreInner {
    writer: StorageWriter,
    reader: StorageReader,
}

impl ItemStore {
    /// Opens the store in `data_dir`, creating the table if absent.
    ///
    /// # Errors
    ///
    /// Fails if the table cannot be created or if the startup scan finds a
    /// corrupt record.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let writer = StorageWriter::open(data_dir)?;
        let reader = StorageReader::open(writer.path())?;

        Logger::info(
            "STORE_OPENED",
            &[
                ("items", &writer.item_count().to_string()),
                ("next_id", &writer.next_id().to_string()),
                ("path", &writer.path().display().to_string()),
            ],
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            inner: Mutex::new(StoreInner { writer, reader }),
            open_sessions: AtomicUsize::new(0),
        })
    }

    /// Returns the data directory this store was opened from.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Acquires a session. The session is released when dropped.
    pub fn session(self: &Arc<Self>) -> Session {
        self.open_sessions.fetch_add(1, Ordering::SeqCst);
        Session::new(Uuid::new_v4(), Arc::clone(self))
    }

    /// Runs `f` inside a fresh session and releases it afterwards, on every
    /// exit path.
    pub fn with_session<R>(self: &Arc<Self>, f: impl FnOnce(&Session) -> R) -> R {
        let session = self.session();
        f(&session)
    }

    /// Number of sessions currently held.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Number of live items.
    pub fn item_count(&self) -> StorageResult<usize> {
        Ok(self.lock()?.writer.item_count())
    }

    #[cfg(test)]
    pub(super) fn inject_write_fault(&self, fault: crate::storage::WriteFault) {
        if let Ok(mut inner) = self.lock() {
            inner.writer.inject_fault(fault);
        }
    }

    pub(super) fn release(&self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
    }

    pub(super) fn lock(&self) -> StorageResult<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|_| StorageError::write_failed_no_source("Item store lock poisoned"))
    }
}

impl fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemStore")
            .field("data_dir", &self.data_dir)
            .field("open_sessions", &self.open_sessions())
            .finish()
    }
}

impl StoreInner {
    pub(super) fn insert(&mut self, fields: &ItemCreate) -> StorageResult<Item> {
        let id = self.writer.next_id();
        self.write_live(id, fields)?;
        Ok(Item::new(id, fields.clone()))
    }

    pub(super) fn get(&mut self, id: i64) -> StorageResult<Option<Item>> {
        match self.writer.get_item_offset(id) {
            Some(offset) => self.read_item(offset).map(Some),
            None => Ok(None),
        }
    }

    pub(super) fn list(&mut self, params: ListParams) -> StorageResult<Vec<Item>> {
        self.writer
            .page_offsets(params.skip, params.limit)
            .into_iter()
            .map(|(_, offset)| self.read_item(offset))
            .collect()
    }

    pub(super) fn replace(&mut self, id: i64, fields: &ItemCreate) -> StorageResult<Option<Item>> {
        if self.writer.get_item_offset(id).is_none() {
            return Ok(None);
        }
        self.write_live(id, fields)?;
        Ok(Some(Item::new(id, fields.clone())))
    }

    pub(super) fn remove(&mut self, id: i64) -> StorageResult<bool> {
        if self.writer.get_item_offset(id).is_none() {
            return Ok(false);
        }
        self.writer.write_tombstone(id)?;
        Ok(true)
    }

    fn write_live(&mut self, id: i64, fields: &ItemCreate) -> StorageResult<u64> {
        let body = serde_json::to_vec(fields).map_err(|e| {
            StorageError::write_failed_no_source(format!("Failed to encode item {}: {}", id, e))
        })?;
        self.writer.write(&ItemRecord::live(id, body))
    }

    fn read_item(&mut self, offset: u64) -> StorageResult<Item> {
        let record = self.reader.read_at(offset)?;
        if record.is_tombstone {
            return Err(StorageError::corruption_for_item(
                record.id,
                "Index points at a tombstone",
            ));
        }
        let fields: ItemCreate = serde_json::from_slice(&record.body).map_err(|e| {
            StorageError::corruption_for_item(record.id, format!("Undecodable item body: {}", e))
        })?;
        Ok(Item::new(record.id, fields))
    }
}
