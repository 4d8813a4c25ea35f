//! Work item types and field validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::{Result, TrackerError};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9_+&*-]+(?:\.[a-zA-Z0-9_+&*-]+)*@(?:[a-zA-Z0-9-]+\.)+[a-zA-Z]{2,7}$")
        .expect("email pattern is a valid regex")
});

/// Check an email address against the validation pattern
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Lifecycle status of a work item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Awaiting processing
    Pending,
    /// Successfully processed
    Processed,
    /// Explicitly marked failed (never set by the batch processor)
    Failed,
}

impl ItemStatus {
    /// Stable string form, used on the wire and in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Processed => "processed",
            ItemStatus::Failed => "failed",
        }
    }

    /// Parse a stored status string, defaulting unknown values to Pending
    pub fn from_db(value: &str) -> Self {
        match value {
            "processed" => ItemStatus::Processed,
            "failed" => ItemStatus::Failed,
            _ => ItemStatus::Pending,
        }
    }
}

/// A tracked work item
///
/// `version` is the optimistic concurrency token: it starts at 1 on insert,
/// is incremented by every successful save, and is never exposed on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Store-assigned identifier, immutable once created
    pub id: i64,
    /// Item name, never empty once persisted
    pub name: String,
    /// Optional free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Lifecycle status
    pub status: ItemStatus,
    /// Contact email, always matches the validation pattern once persisted
    pub email: String,
    /// Optimistic locking version
    #[serde(skip)]
    pub version: i64,
}

/// Request payload for creating or updating an item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub email: String,
    /// Defaults to Pending on create; an explicit value overrides the stored
    /// status on update
    #[serde(default)]
    pub status: Option<ItemStatus>,
}

impl ItemDraft {
    /// Validate field constraints, reporting every violated field at once
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push("name is required");
        }
        if self.email.trim().is_empty() {
            violations.push("email is required");
        } else if !is_valid_email(&self.email) {
            violations.push("email format is invalid");
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(TrackerError::Validation(violations.join("; ")))
        }
    }

    /// Convert a validated draft into an insertable item
    pub fn into_new_item(self) -> NewItem {
        NewItem {
            name: self.name,
            description: self.description,
            status: self.status.unwrap_or(ItemStatus::Pending),
            email: self.email,
        }
    }
}

/// Validated payload handed to the store for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: Option<String>,
    pub status: ItemStatus,
    pub email: String,
}
