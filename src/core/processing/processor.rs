//! Batch processor implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::core::items::{ItemStatus, WorkItem};
use crate::core::processing::types::{BatchReport, FailureKind, ProcessFailure, ProcessOutcome};
use crate::core::processing::worker_pool::WorkerPool;
use crate::storage::ItemStore;
use crate::utils::error::{Result, TrackerError};

/// The per-item processing transform
///
/// Injected so tests can run the batch routine deterministically and so the
/// transform itself stays a pure function of the item's fields; any delay or
/// external work lives behind this seam, not in the processor.
#[async_trait]
pub trait ItemTransform: Send + Sync {
    async fn apply(&self, item: WorkItem) -> Result<WorkItem>;
}

/// Default transform: mark the item processed
pub struct MarkProcessed;

#[async_trait]
impl ItemTransform for MarkProcessed {
    async fn apply(&self, mut item: WorkItem) -> Result<WorkItem> {
        item.status = ItemStatus::Processed;
        Ok(item)
    }
}

/// Processes every known item in parallel, bounded by the worker pool, with
/// per-item failure isolation
pub struct BatchProcessor {
    store: Arc<dyn ItemStore>,
    pool: Arc<WorkerPool>,
    transform: Arc<dyn ItemTransform>,
    processed_total: AtomicU64,
}

impl BatchProcessor {
    /// Create a processor with the default mark-processed transform
    pub fn new(store: Arc<dyn ItemStore>, pool: Arc<WorkerPool>) -> Self {
        Self::with_transform(store, pool, Arc::new(MarkProcessed))
    }

    /// Create a processor with a custom transform
    pub fn with_transform(
        store: Arc<dyn ItemStore>,
        pool: Arc<WorkerPool>,
        transform: Arc<dyn ItemTransform>,
    ) -> Self {
        Self {
            store,
            pool,
            transform,
            processed_total: AtomicU64::new(0),
        }
    }

    /// Items processed successfully over this processor's lifetime
    pub fn processed_total(&self) -> u64 {
        self.processed_total.load(Ordering::Relaxed)
    }

    /// Process a snapshot of all items
    ///
    /// Takes a point-in-time snapshot, submits one task per item, waits for
    /// every task to resolve, and returns the partitioned outcomes. Items
    /// created or deleted after the snapshot are not part of this run. The
    /// call itself fails only if the snapshot read fails; per-item errors are
    /// returned as data, never re-raised.
    pub async fn process_all(&self) -> Result<BatchReport> {
        let snapshot = self.store.find_all().await?;
        if snapshot.is_empty() {
            debug!("no items to process");
            return Ok(BatchReport::default());
        }

        info!(count = snapshot.len(), "processing item snapshot");

        let mut handles = Vec::with_capacity(snapshot.len());
        let mut failures = Vec::new();
        for item in snapshot {
            let item_id = item.id;
            let store = Arc::clone(&self.store);
            let transform = Arc::clone(&self.transform);
            match self.pool.submit(process_one(store, transform, item)) {
                Ok(handle) => handles.push((item_id, handle)),
                Err(e) => failures.push(ProcessFailure::new(
                    item_id,
                    FailureKind::Processing,
                    e.to_string(),
                )),
            }
        }

        // The only blocking point: wait for every submitted task to resolve.
        let mut processed = Vec::new();
        for (item_id, handle) in handles {
            match handle.join().await {
                Ok(ProcessOutcome::Success(item)) => {
                    self.processed_total.fetch_add(1, Ordering::Relaxed);
                    processed.push(item);
                }
                Ok(ProcessOutcome::Failure(failure)) => failures.push(failure),
                Err(task_error) => failures.push(ProcessFailure::new(
                    item_id,
                    FailureKind::Processing,
                    task_error.to_string(),
                )),
            }
        }

        if !failures.is_empty() {
            warn!(
                processed = processed.len(),
                failed = failures.len(),
                "batch completed with failures"
            );
            for failure in &failures {
                warn!(
                    item_id = failure.item_id,
                    kind = ?failure.kind,
                    "item processing failed: {}",
                    failure.message
                );
            }
        } else {
            info!(processed = processed.len(), "batch completed");
        }

        Ok(BatchReport {
            processed,
            failures,
        })
    }
}

/// Transform and persist a single item, capturing every failure as data
async fn process_one(
    store: Arc<dyn ItemStore>,
    transform: Arc<dyn ItemTransform>,
    item: WorkItem,
) -> ProcessOutcome {
    let item_id = item.id;

    let updated = match transform.apply(item).await {
        Ok(updated) => updated,
        Err(e) => return ProcessOutcome::failure(item_id, FailureKind::Processing, e.to_string()),
    };

    // The save is the single atomic persistence step: it either lands with
    // the version check intact or not at all.
    match store.save(&updated).await {
        Ok(saved) => ProcessOutcome::Success(saved),
        Err(TrackerError::VersionConflict(message)) => {
            ProcessOutcome::failure(item_id, FailureKind::VersionConflict, message)
        }
        Err(e) => ProcessOutcome::failure(item_id, FailureKind::Processing, e.to_string()),
    }
}
