//! In-memory item store
//!
//! Backs tests and embedded usage. Implements the same compare-and-set save
//! semantics as the database store, with per-record atomicity provided by a
//! single write lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::items::{NewItem, WorkItem};
use crate::storage::ItemStore;
use crate::utils::error::{Result, TrackerError};

/// HashMap-backed item store
#[derive(Debug)]
pub struct InMemoryStore {
    items: RwLock<HashMap<i64, WorkItem>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<WorkItem>> {
        let items = self.items.read().await;
        let mut all: Vec<WorkItem> = items.values().cloned().collect();
        all.sort_by_key(|item| item.id);
        Ok(all)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<WorkItem>> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn insert(&self, item: &NewItem) -> Result<WorkItem> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = WorkItem {
            id,
            name: item.name.clone(),
            description: item.description.clone(),
            status: item.status,
            email: item.email.clone(),
            version: 1,
        };

        let mut items = self.items.write().await;
        items.insert(id, stored.clone());
        Ok(stored)
    }

    async fn save(&self, item: &WorkItem) -> Result<WorkItem> {
        let mut items = self.items.write().await;
        let current = items
            .get(&item.id)
            .ok_or_else(|| TrackerError::NotFound(format!("item {} not found", item.id)))?;

        if current.version != item.version {
            return Err(TrackerError::VersionConflict(format!(
                "item {} was modified concurrently (expected version {}, found {})",
                item.id, item.version, current.version
            )));
        }

        let mut stored = item.clone();
        stored.version = item.version + 1;
        items.insert(item.id, stored.clone());
        Ok(stored)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let mut items = self.items.write().await;
        items.remove(&id);
        Ok(())
    }
}
