//! Storage layer for work items
//!
//! The store is the only shared mutable resource in the system. Its `save`
//! is a compare-and-set on the item's version: a stale expected version is a
//! `VersionConflict`, never a silent overwrite.

pub mod database;
pub mod memory;

use async_trait::async_trait;

use crate::core::items::{NewItem, WorkItem};
use crate::utils::error::Result;

pub use database::Database;
pub use memory::InMemoryStore;

/// Durable store for work items
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Point-in-time snapshot of all items
    async fn find_all(&self) -> Result<Vec<WorkItem>>;

    /// Look up a single item
    async fn find_by_id(&self, id: i64) -> Result<Option<WorkItem>>;

    /// Insert a new item; the store assigns the id and starts the version
    /// at 1
    async fn insert(&self, item: &NewItem) -> Result<WorkItem>;

    /// Persist an update if and only if the stored version still equals
    /// `item.version`; returns the item with the incremented version, or
    /// `VersionConflict` if another actor modified the record first
    async fn save(&self, item: &WorkItem) -> Result<WorkItem>;

    /// Remove an item; removing an absent id is not an error
    async fn delete_by_id(&self, id: i64) -> Result<()>;
}
