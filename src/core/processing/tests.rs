//! Worker pool and batch processor tests

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::core::items::{ItemDraft, ItemStatus, WorkItem};
use crate::core::processing::{
    BatchProcessor, FailureKind, ItemTransform, MarkProcessed, TaskError, WorkerPool,
};
use crate::storage::ItemStore;
use crate::storage::memory::InMemoryStore;
use crate::utils::error::{Result, TrackerError};

fn draft(name: &str) -> ItemDraft {
    ItemDraft {
        name: name.to_string(),
        description: None,
        email: "alice@example.com".to_string(),
        status: None,
    }
}

async fn seeded_store(count: usize) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    for i in 0..count {
        store
            .insert(&draft(&format!("item-{i}")).into_new_item())
            .await
            .unwrap();
    }
    store
}

// ==================== WorkerPool ====================

#[tokio::test]
async fn test_pool_executes_submitted_tasks() {
    let pool = WorkerPool::new(4);

    let handles: Vec<_> = (0..8)
        .map(|i| pool.submit(async move { i * 2 }).unwrap())
        .collect();

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.join().await.unwrap());
    }
    results.sort_unstable();
    assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12, 14]);

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_pool_captures_panics_without_disturbing_siblings() {
    let pool = WorkerPool::new(2);

    let panicking = pool
        .submit(async {
            panic!("boom");
        })
        .unwrap();
    let healthy = pool.submit(async { 41 + 1 }).unwrap();

    match panicking.join().await {
        Err(TaskError::Panicked(message)) => assert!(message.contains("boom")),
        other => panic!("expected captured panic, got {other:?}"),
    }
    assert_eq!(healthy.join().await.unwrap(), 42);

    // The pool is still usable after a panic.
    let after = pool.submit(async { "still alive" }).unwrap();
    assert_eq!(after.join().await.unwrap(), "still alive");

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_pool_respects_capacity_bound() {
    let capacity = 3;
    let pool = WorkerPool::new(capacity);
    let current = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let current = Arc::clone(&current);
            let max_seen = Arc::clone(&max_seen);
            pool.submit(async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                max_seen.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                current.fetch_sub(1, Ordering::SeqCst);
            })
            .unwrap()
        })
        .collect();

    for handle in handles {
        handle.join().await.unwrap();
    }

    let observed = max_seen.load(Ordering::SeqCst);
    assert!(observed >= 1);
    assert!(
        observed <= capacity,
        "observed {observed} concurrent tasks, capacity is {capacity}"
    );

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_submit_after_shutdown_fails() {
    let pool = WorkerPool::new(2);
    pool.shutdown(Duration::from_secs(1)).await;

    let error = pool.submit(async { 1 }).unwrap_err();
    assert!(matches!(error, TrackerError::Processing(_)));
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let pool = WorkerPool::new(2);
    pool.shutdown(Duration::from_secs(1)).await;

    let started = Instant::now();
    pool.shutdown(Duration::from_secs(30)).await;
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_shutdown_timeout_cancels_stuck_tasks() {
    let pool = WorkerPool::new(1);

    let stuck = pool
        .submit(async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        })
        .unwrap();

    let started = Instant::now();
    pool.shutdown(Duration::from_millis(50)).await;
    // Returns at the timeout plus a bounded grace period, not after an hour.
    assert!(started.elapsed() < Duration::from_secs(5));

    assert_eq!(stuck.join().await, Err(TaskError::Cancelled));
}

#[tokio::test]
async fn test_pool_drains_queue_on_graceful_shutdown() {
    let pool = WorkerPool::new(1);
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let completed = Arc::clone(&completed);
            pool.submit(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                completed.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap()
        })
        .collect();

    pool.shutdown(Duration::from_secs(5)).await;
    assert_eq!(completed.load(Ordering::SeqCst), 5);
    assert_eq!(pool.active_count(), 0);

    for handle in handles {
        handle.join().await.unwrap();
    }
}

// ==================== Transforms used by processor tests ====================

/// Fails the transform step for one specific item
struct FailFor(i64);

#[async_trait]
impl ItemTransform for FailFor {
    async fn apply(&self, item: WorkItem) -> Result<WorkItem> {
        if item.id == self.0 {
            return Err(TrackerError::Processing(
                "simulated transform failure".to_string(),
            ));
        }
        MarkProcessed.apply(item).await
    }
}

/// Panics for one specific item
struct PanicFor(i64);

#[async_trait]
impl ItemTransform for PanicFor {
    async fn apply(&self, item: WorkItem) -> Result<WorkItem> {
        if item.id == self.0 {
            panic!("simulated panic");
        }
        MarkProcessed.apply(item).await
    }
}

/// Concurrently modifies one item behind the batch's back, so the batch
/// task's own save hits a stale version
struct ConflictFor {
    target: i64,
    store: Arc<InMemoryStore>,
}

#[async_trait]
impl ItemTransform for ConflictFor {
    async fn apply(&self, item: WorkItem) -> Result<WorkItem> {
        if item.id == self.target {
            let sneaky = self
                .store
                .find_by_id(item.id)
                .await?
                .expect("target item exists");
            self.store.save(&sneaky).await?;
        }
        MarkProcessed.apply(item).await
    }
}

/// Counts how many transforms run at once
struct TrackConcurrency {
    current: Arc<AtomicUsize>,
    max_seen: Arc<AtomicUsize>,
}

#[async_trait]
impl ItemTransform for TrackConcurrency {
    async fn apply(&self, item: WorkItem) -> Result<WorkItem> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_seen.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        MarkProcessed.apply(item).await
    }
}

// ==================== BatchProcessor ====================

#[tokio::test]
async fn test_process_all_marks_pending_items_processed() {
    let store = seeded_store(2).await;
    let pool = Arc::new(WorkerPool::new(4));
    let processor = BatchProcessor::new(store.clone(), pool.clone());

    let report = processor.process_all().await.unwrap();

    assert_eq!(report.processed.len(), 2);
    assert!(report.is_complete());
    for item in &report.processed {
        assert_eq!(item.status, ItemStatus::Processed);
        assert_eq!(item.version, 2);
    }

    // The store reflects the run.
    for stored in store.find_all().await.unwrap() {
        assert_eq!(stored.status, ItemStatus::Processed);
    }

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_process_all_on_empty_store_returns_empty_report() {
    let store = Arc::new(InMemoryStore::new());
    let pool = Arc::new(WorkerPool::new(2));
    let processor = BatchProcessor::new(store, pool.clone());

    let report = processor.process_all().await.unwrap();
    assert_eq!(report.total(), 0);
    assert!(report.is_complete());

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_every_snapshot_item_is_reported_exactly_once() {
    let store = seeded_store(25).await;
    let snapshot_ids: HashSet<i64> = store
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|item| item.id)
        .collect();

    let pool = Arc::new(WorkerPool::new(4));
    let failing_id = *snapshot_ids.iter().next().unwrap();
    let processor =
        BatchProcessor::with_transform(store.clone(), pool.clone(), Arc::new(FailFor(failing_id)));

    let report = processor.process_all().await.unwrap();

    assert_eq!(report.total(), 25);
    let mut reported_ids: Vec<i64> = report
        .processed
        .iter()
        .map(|item| item.id)
        .chain(report.failures.iter().map(|failure| failure.item_id))
        .collect();
    reported_ids.sort_unstable();
    reported_ids.dedup();
    assert_eq!(reported_ids.len(), 25, "no loss, no duplication");
    assert_eq!(
        reported_ids.into_iter().collect::<HashSet<i64>>(),
        snapshot_ids
    );

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_version_conflict_is_isolated_to_one_item() {
    let store = seeded_store(5).await;
    let target = store.find_all().await.unwrap()[0].id;
    let pool = Arc::new(WorkerPool::new(4));
    let processor = BatchProcessor::with_transform(
        store.clone(),
        pool.clone(),
        Arc::new(ConflictFor {
            target,
            store: store.clone(),
        }),
    );

    let report = processor.process_all().await.unwrap();

    assert_eq!(report.processed.len(), 4);
    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.item_id, target);
    assert_eq!(failure.kind, FailureKind::VersionConflict);

    // The concurrent write won; the batch did not overwrite it.
    let stored = store.find_by_id(target).await.unwrap().unwrap();
    assert_eq!(stored.status, ItemStatus::Pending);

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_transform_failure_leaves_status_unchanged() {
    let store = seeded_store(3).await;
    let target = store.find_all().await.unwrap()[1].id;
    let pool = Arc::new(WorkerPool::new(2));
    let processor =
        BatchProcessor::with_transform(store.clone(), pool.clone(), Arc::new(FailFor(target)));

    let report = processor.process_all().await.unwrap();

    assert_eq!(report.processed.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Processing);

    let stored = store.find_by_id(target).await.unwrap().unwrap();
    assert_eq!(stored.status, ItemStatus::Pending);
    assert_eq!(stored.version, 1);

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_task_panic_becomes_failure_not_abort() {
    let store = seeded_store(4).await;
    let target = store.find_all().await.unwrap()[2].id;
    let pool = Arc::new(WorkerPool::new(2));
    let processor =
        BatchProcessor::with_transform(store.clone(), pool.clone(), Arc::new(PanicFor(target)));

    let report = processor.process_all().await.unwrap();

    assert_eq!(report.processed.len(), 3);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].item_id, target);
    assert_eq!(report.failures[0].kind, FailureKind::Processing);

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_processing_respects_pool_capacity() {
    let store = seeded_store(10).await;
    let pool = Arc::new(WorkerPool::new(2));
    let current = Arc::new(AtomicUsize::new(0));
    let max_seen = Arc::new(AtomicUsize::new(0));
    let processor = BatchProcessor::with_transform(
        store,
        pool.clone(),
        Arc::new(TrackConcurrency {
            current: Arc::clone(&current),
            max_seen: Arc::clone(&max_seen),
        }),
    );

    let report = processor.process_all().await.unwrap();
    assert_eq!(report.processed.len(), 10);
    assert!(max_seen.load(Ordering::SeqCst) <= 2);

    pool.shutdown(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn test_processed_total_accumulates_across_runs() {
    let store = seeded_store(3).await;
    let pool = Arc::new(WorkerPool::new(2));
    let processor = BatchProcessor::new(store, pool.clone());

    processor.process_all().await.unwrap();
    assert_eq!(processor.processed_total(), 3);

    // A second run processes the (already processed) items again.
    processor.process_all().await.unwrap();
    assert_eq!(processor.processed_total(), 6);

    pool.shutdown(Duration::from_secs(1)).await;
}
