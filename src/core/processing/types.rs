//! Batch processing result types

use serde::Serialize;

use crate::core::items::WorkItem;

/// Why an individual item's processing did not complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The stored version no longer matched at save time; another actor
    /// modified the item after the snapshot was taken
    VersionConflict,
    /// Any other transform or persistence failure
    Processing,
}

/// A captured per-item failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessFailure {
    /// Identifier of the item whose task failed
    pub item_id: i64,
    /// Failure classification
    pub kind: FailureKind,
    /// Human-readable description
    pub message: String,
}

/// Tagged result of one item's processing task
///
/// Tasks always resolve to one of these; an error inside a task never
/// escapes to the aggregation barrier.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// The updated item, as persisted (version already incremented)
    Success(WorkItem),
    /// The captured failure for this item
    Failure(ProcessFailure),
}

impl ProcessOutcome {
    /// Build a failure outcome
    pub fn failure<S: Into<String>>(item_id: i64, kind: FailureKind, message: S) -> Self {
        ProcessOutcome::Failure(ProcessFailure::new(item_id, kind, message))
    }
}

impl ProcessFailure {
    /// Build a failure record
    pub fn new<S: Into<String>>(item_id: i64, kind: FailureKind, message: S) -> Self {
        Self {
            item_id,
            kind,
            message: message.into(),
        }
    }
}

/// Aggregate result of one batch run
///
/// Partitioned outcomes: every item from the snapshot appears in exactly one
/// of the two lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// Items processed and persisted successfully
    pub processed: Vec<WorkItem>,
    /// Per-item failures
    pub failures: Vec<ProcessFailure>,
}

impl BatchReport {
    /// Total number of outcomes in the report
    pub fn total(&self) -> usize {
        self.processed.len() + self.failures.len()
    }

    /// Whether every item in the snapshot was processed successfully
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::items::ItemStatus;

    fn item(id: i64) -> WorkItem {
        WorkItem {
            id,
            name: format!("item-{id}"),
            description: None,
            status: ItemStatus::Processed,
            email: "alice@example.com".to_string(),
            version: 2,
        }
    }

    #[test]
    fn test_report_totals() {
        let report = BatchReport {
            processed: vec![item(1), item(2)],
            failures: vec![ProcessFailure {
                item_id: 3,
                kind: FailureKind::VersionConflict,
                message: "stale".to_string(),
            }],
        };

        assert_eq!(report.total(), 3);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_empty_report_is_complete() {
        let report = BatchReport::default();
        assert_eq!(report.total(), 0);
        assert!(report.is_complete());
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::VersionConflict).unwrap();
        assert_eq!(json, "\"version_conflict\"");
    }
}
