use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::debug;

use crate::core::items::{NewItem, WorkItem};
use crate::storage::ItemStore;
use crate::utils::error::{Result, TrackerError};

use super::super::entities::{self, item};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Snapshot of all items, ordered by id
    pub async fn find_all_items(&self) -> Result<Vec<WorkItem>> {
        let models = entities::Item::find()
            .order_by_asc(item::Column::Id)
            .all(&self.db)
            .await
            .map_err(TrackerError::Database)?;

        Ok(models.iter().map(item::Model::to_domain_item).collect())
    }

    /// Find item by ID
    pub async fn find_item_by_id(&self, id: i64) -> Result<Option<WorkItem>> {
        debug!("Finding item by ID: {}", id);

        let model = entities::Item::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(TrackerError::Database)?;

        Ok(model.map(|m| m.to_domain_item()))
    }

    /// Insert a new item
    pub async fn insert_item(&self, item: &NewItem) -> Result<WorkItem> {
        debug!("Inserting item: {}", item.name);

        let model = item::Model::from_new_item(item)
            .insert(&self.db)
            .await
            .map_err(TrackerError::Database)?;

        Ok(model.to_domain_item())
    }

    /// Compare-and-set save
    ///
    /// The update is filtered on both id and the caller's version, so it
    /// lands only if no other actor has written the record since the caller
    /// read it. `rows_affected == 0` means either the record is gone or the
    /// version is stale.
    pub async fn save_item(&self, item: &WorkItem) -> Result<WorkItem> {
        debug!(
            "Saving item {} at expected version {}",
            item.id, item.version
        );

        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        let result = entities::Item::update_many()
            .col_expr(item::Column::Name, Expr::value(item.name.clone()))
            .col_expr(
                item::Column::Description,
                Expr::value(item.description.clone()),
            )
            .col_expr(item::Column::Status, Expr::value(item.status.as_str()))
            .col_expr(item::Column::Email, Expr::value(item.email.clone()))
            .col_expr(item::Column::UpdatedAt, Expr::value(now))
            .col_expr(item::Column::Version, Expr::value(item.version + 1))
            .filter(item::Column::Id.eq(item.id))
            .filter(item::Column::Version.eq(item.version))
            .exec(&self.db)
            .await
            .map_err(TrackerError::Database)?;

        if result.rows_affected == 0 {
            return match self.find_item_by_id(item.id).await? {
                Some(current) => Err(TrackerError::VersionConflict(format!(
                    "item {} was modified concurrently (expected version {}, found {})",
                    item.id, item.version, current.version
                ))),
                None => Err(TrackerError::NotFound(format!("item {} not found", item.id))),
            };
        }

        self.find_item_by_id(item.id)
            .await?
            .ok_or_else(|| TrackerError::Internal(format!("item {} vanished after save", item.id)))
    }

    /// Delete item by ID
    pub async fn delete_item_by_id(&self, id: i64) -> Result<()> {
        debug!("Deleting item: {}", id);

        entities::Item::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(TrackerError::Database)?;

        Ok(())
    }
}

#[async_trait]
impl ItemStore for SeaOrmDatabase {
    async fn find_all(&self) -> Result<Vec<WorkItem>> {
        self.find_all_items().await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<WorkItem>> {
        self.find_item_by_id(id).await
    }

    async fn insert(&self, item: &NewItem) -> Result<WorkItem> {
        self.insert_item(item).await
    }

    async fn save(&self, item: &WorkItem) -> Result<WorkItem> {
        self.save_item(item).await
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        self.delete_item_by_id(id).await
    }
}
