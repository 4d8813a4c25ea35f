use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::items::{ItemStatus, NewItem, WorkItem};

/// Work item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    /// Item ID (store-assigned, auto-increment)
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Item name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Lifecycle status
    pub status: String,

    /// Contact email
    pub email: String,

    /// Creation timestamp
    pub created_at: DateTimeWithTimeZone,

    /// Last update timestamp
    pub updated_at: DateTimeWithTimeZone,

    /// Version for optimistic locking
    pub version: i64,
}

/// Item entity relations
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Conversion methods between SeaORM model and our domain model
impl Model {
    /// Convert SeaORM model to the domain work item
    pub fn to_domain_item(&self) -> WorkItem {
        WorkItem {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            status: ItemStatus::from_db(&self.status),
            email: self.email.clone(),
            version: self.version,
        }
    }

    /// Build an insertable active model from a validated new item
    pub fn from_new_item(item: &NewItem) -> ActiveModel {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        ActiveModel {
            name: Set(item.name.clone()),
            description: Set(item.description.clone()),
            status: Set(item.status.as_str().to_string()),
            email: Set(item.email.clone()),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(1),
            ..Default::default()
        }
    }
}
