//! Per-request session guard

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use super::store::ItemStore;
use crate::item::{Item, ItemCreate, ListParams};
use crate::observability::Logger;
use crate::storage::StorageResult;

/// Scoped handle to the store, valid for one request.
///
/// Created by [`ItemStore::session`]. Dropping it releases the session
/// exactly once, whether the request succeeded, failed or panicked.
pub struct Session {
    id: Uuid,
    store: Arc<ItemStore>,
}

impl Session {
    pub(super) fn new(id: Uuid, store: Arc<ItemStore>) -> Self {
        Self { id, store }
    }

    /// Inserts a new item and returns it with its assigned id.
    pub fn create(&self, fields: &ItemCreate) -> StorageResult<Item> {
        let item = self.store.lock()?.insert(fields)?;
        Logger::info(
            "ITEM_CREATED",
            &[
                ("item_id", &item.id.to_string()),
                ("session_id", &self.id.to_string()),
            ],
        );
        Ok(item)
    }

    /// Returns live items in ascending id order.
    pub fn list(&self, params: ListParams) -> StorageResult<Vec<Item>> {
        self.store.lock()?.list(params)
    }

    /// Returns the item with `id`, if present.
    pub fn get(&self, id: i64) -> StorageResult<Option<Item>> {
        self.store.lock()?.get(id)
    }

    /// Overwrites every field of an existing item. `None` if absent.
    pub fn update(&self, id: i64, fields: &ItemCreate) -> StorageResult<Option<Item>> {
        let updated = self.store.lock()?.replace(id, fields)?;
        if updated.is_some() {
            Logger::info(
                "ITEM_UPDATED",
                &[
                    ("item_id", &id.to_string()),
                    ("session_id", &self.id.to_string()),
                ],
            );
        }
        Ok(updated)
    }

    /// Permanently removes an item. `false` if absent.
    pub fn delete(&self, id: i64) -> StorageResult<bool> {
        let removed = self.store.lock()?.remove(id)?;
        if removed {
            Logger::info(
                "ITEM_DELETED",
                &[
                    ("item_id", &id.to_string()),
                    ("session_id", &self.id.to_string()),
                ],
            );
        }
        Ok(removed)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.store.release();
        Logger::trace("SESSION_RELEASED", &[("session_id", &self.id.to_string())]);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}
