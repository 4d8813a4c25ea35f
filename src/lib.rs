//! # itemflow
//!
//! A work item tracking service: CRUD access to items plus a bulk concurrent
//! processing routine that fans a snapshot of items out over a bounded
//! worker pool with per-item failure isolation.
//!
//! ## Features
//!
//! - **CRUD API**: JSON endpoints for creating, reading, updating, and
//!   deleting work items, with field validation up front
//! - **Bulk processing**: one task per item on a fixed-capacity worker pool;
//!   a single bad item never aborts the rest of the batch
//! - **Optimistic locking**: every save is a compare-and-set on the item's
//!   version, so concurrent writers get a conflict instead of a lost update
//! - **Pluggable storage**: SeaORM over PostgreSQL or SQLite, with an
//!   in-memory store for tests and embedded use
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use itemflow::{Config, Tracker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/tracker.yaml").await?;
//!     let tracker = Tracker::new(config).await?;
//!     tracker.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Embedded batch processing
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use itemflow::{BatchProcessor, InMemoryStore, WorkerPool};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(InMemoryStore::new());
//!     let pool = Arc::new(WorkerPool::with_default_capacity());
//!     let processor = BatchProcessor::new(store, pool.clone());
//!
//!     let report = processor.process_all().await?;
//!     println!("processed {} items", report.processed.len());
//!
//!     pool.shutdown(std::time::Duration::from_secs(30)).await;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

// Public module exports
pub mod config;
pub mod core;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{Result, TrackerError};

// Export the item domain
pub use crate::core::items::{ItemDraft, ItemService, ItemStatus, NewItem, WorkItem};

// Export the processing core
pub use crate::core::processing::{
    BatchProcessor, BatchReport, FailureKind, ItemTransform, MarkProcessed, ProcessFailure,
    ProcessOutcome, TaskError, TaskHandle, WorkerPool,
};

// Export storage backends
pub use storage::{Database, InMemoryStore, ItemStore};

use tracing::info;

/// A minimal tracker service facade
pub struct Tracker {
    server: server::HttpServer,
}

impl Tracker {
    /// Create a new tracker instance
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new tracker instance");

        let server = server::HttpServer::new(&config).await?;

        Ok(Self { server })
    }

    /// Run the tracker server
    pub async fn run(self) -> Result<()> {
        info!("Starting itemflow tracker");

        self.server.start().await
    }
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
