//! Application state shared across HTTP handlers

use std::sync::Arc;

use crate::config::Config;
use crate::core::items::ItemService;
use crate::core::processing::{BatchProcessor, WorkerPool};
use crate::storage::ItemStore;

/// HTTP server state shared across handlers
///
/// All fields are wrapped in Arc for efficient sharing across threads. The
/// worker pool and batch processor are constructed once by the composition
/// root and live for the lifetime of the server.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration (shared read-only)
    pub config: Arc<Config>,
    /// Item store
    pub store: Arc<dyn ItemStore>,
    /// Single-record CRUD service
    pub items: Arc<ItemService>,
    /// Bulk concurrent batch processor
    pub processor: Arc<BatchProcessor>,
    /// Bounded worker pool backing the processor
    pub pool: Arc<WorkerPool>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Config, store: Arc<dyn ItemStore>, pool: Arc<WorkerPool>) -> Self {
        let items = Arc::new(ItemService::new(Arc::clone(&store)));
        let processor = Arc::new(BatchProcessor::new(Arc::clone(&store), Arc::clone(&pool)));

        Self {
            config: Arc::new(config),
            store,
            items,
            processor,
            pool,
        }
    }

    /// Get service configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
