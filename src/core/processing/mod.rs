//! Bounded concurrent batch processing
//!
//! This module contains the worker pool that bounds how many processing
//! tasks run at once, and the batch processor that fans a snapshot of items
//! out over it with per-item failure isolation.

mod processor;
mod types;
mod worker_pool;

#[cfg(test)]
mod tests;

pub use processor::{BatchProcessor, ItemTransform, MarkProcessed};
pub use types::{BatchReport, FailureKind, ProcessFailure, ProcessOutcome};
pub use worker_pool::{TaskError, TaskHandle, WorkerPool};
