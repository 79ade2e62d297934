//! Area repository.

use std::sync::Arc;

use crate::entities::{Area, Issue, area, issue, notification};
use elytra_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait, sea_query::Expr,
};

/// Area repository for database operations.
#[derive(Clone)]
pub struct AreaRepository {
    db: Arc<DatabaseConnection>,
}

impl AreaRepository {
    /// Create a new area repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an area by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<area::Model>> {
        Area::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an area by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<area::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Area not found: {id}")))
    }

    /// Get all areas belonging to a zone, by name.
    pub async fn find_by_zone(&self, zone_id: &str) -> AppResult<Vec<area::Model>> {
        Area::find()
            .filter(area::Column::ZoneId.eq(zone_id))
            .order_by_asc(area::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if an area with this name exists in the zone.
    pub async fn exists_by_zone_and_name(&self, zone_id: &str, name: &str) -> AppResult<bool> {
        Ok(Area::find()
            .filter(area::Column::ZoneId.eq(zone_id))
            .filter(area::Column::Name.eq(name))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            > 0)
    }

    /// Insert an area and its broadcast notifications in one transaction.
    pub async fn create_with_broadcast(
        &self,
        model: area::ActiveModel,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<area::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Area already exists with this name in the zone".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        notification::Entity::insert_many(notifications)
            .on_empty_do_nothing()
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Apply a rename and its broadcast notifications in one transaction.
    pub async fn update_with_broadcast(
        &self,
        model: area::ActiveModel,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<area::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = model.update(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Area already exists with this name in the zone".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        notification::Entity::insert_many(notifications)
            .on_empty_do_nothing()
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Delete an area in one transaction: clear the area tag of issues
    /// referencing it, remove the area, then persist the broadcast
    /// notifications.
    pub async fn delete_with_broadcast(
        &self,
        id: &str,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Issue::update_many()
            .col_expr(issue::Column::AreaId, Expr::value(None::<String>))
            .filter(issue::Column::AreaId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Area::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        notification::Entity::insert_many(notifications)
            .on_empty_do_nothing()
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_area(id: &str, zone_id: &str, name: &str) -> area::Model {
        area::Model {
            id: id.to_string(),
            zone_id: zone_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_zone() {
        let a1 = create_test_area("a1", "z1", "Market Street");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[a1]])
                .into_connection(),
        );

        let repo = AreaRepository::new(db);
        let result = repo.find_by_zone("z1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Market Street");
    }

    #[tokio::test]
    async fn test_exists_by_zone_and_name() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let repo = AreaRepository::new(db);
        let exists = repo.exists_by_zone_and_name("z1", "Market Street").await.unwrap();

        assert!(exists);
    }
}
