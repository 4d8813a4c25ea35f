//! Single-record CRUD operations over the item store

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::items::{ItemDraft, WorkItem};
use crate::storage::ItemStore;
use crate::utils::error::{Result, TrackerError};

/// Work item CRUD service
///
/// Validation happens here, before anything reaches the store; a draft that
/// fails field constraints is rejected synchronously.
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    /// Create a new item service
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Retrieve all items
    pub async fn find_all(&self) -> Result<Vec<WorkItem>> {
        self.store.find_all().await
    }

    /// Retrieve a single item by id
    pub async fn find_by_id(&self, id: i64) -> Result<Option<WorkItem>> {
        debug!("finding item by id: {}", id);
        self.store.find_by_id(id).await
    }

    /// Validate and create a new item
    pub async fn create(&self, draft: ItemDraft) -> Result<WorkItem> {
        draft.validate()?;

        let item = self.store.insert(&draft.into_new_item()).await?;
        info!(item_id = item.id, "item created");
        Ok(item)
    }

    /// Validate and update an existing item
    ///
    /// The path id wins over anything in the draft; a missing record is a
    /// NotFound error, and a concurrent modification surfaces as a version
    /// conflict from the store.
    pub async fn update(&self, id: i64, draft: ItemDraft) -> Result<WorkItem> {
        draft.validate()?;

        let mut item = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| TrackerError::NotFound(format!("item {} not found", id)))?;

        item.name = draft.name;
        item.description = draft.description;
        item.email = draft.email;
        if let Some(status) = draft.status {
            item.status = status;
        }

        let updated = self.store.save(&item).await?;
        info!(item_id = updated.id, "item updated");
        Ok(updated)
    }

    /// Delete an item by id; deleting an absent id is not an error
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.store.delete_by_id(id).await?;
        info!(item_id = id, "item deleted");
        Ok(())
    }
}
