//! Zone repository.
//!
//! Zone names are unique among siblings, not globally. The unique index on
//! (city_id, name) is the concurrency guard behind the existence pre-checks
//! in the service layer.

use std::sync::Arc;

use crate::entities::{Issue, Zone, issue, notification, zone};
use elytra_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait, sea_query::Expr,
};

/// Zone repository for database operations.
#[derive(Clone)]
pub struct ZoneRepository {
    db: Arc<DatabaseConnection>,
}

impl ZoneRepository {
    /// Create a new zone repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a zone by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<zone::Model>> {
        Zone::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a zone by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<zone::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Zone not found: {id}")))
    }

    /// Get all zones belonging to a city, by name.
    pub async fn find_by_city(&self, city_id: &str) -> AppResult<Vec<zone::Model>> {
        Zone::find()
            .filter(zone::Column::CityId.eq(city_id))
            .order_by_asc(zone::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a zone with this name exists in the city.
    pub async fn exists_by_city_and_name(&self, city_id: &str, name: &str) -> AppResult<bool> {
        Ok(Zone::find()
            .filter(zone::Column::CityId.eq(city_id))
            .filter(zone::Column::Name.eq(name))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            > 0)
    }

    /// Insert a zone and its broadcast notifications in one transaction.
    pub async fn create_with_broadcast(
        &self,
        model: zone::ActiveModel,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<zone::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Zone already exists with this name in the city".to_string())
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
        model: zone::ActiveModel,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<zone::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = model.update(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Zone already exists with this name in the city".to_string())
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

    /// Delete a zone in one transaction: clear the zone and area tags of
    /// issues referencing it, remove the zone, then persist the broadcast
    /// notifications. Areas under the zone are removed by cascade.
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
            .col_expr(issue::Column::ZoneId, Expr::value(None::<String>))
            .col_expr(issue::Column::AreaId, Expr::value(None::<String>))
            .filter(issue::Column::ZoneId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Zone::delete_by_id(id)
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

    fn create_test_zone(id: &str, city_id: &str, name: &str) -> zone::Model {
        zone::Model {
            id: id.to_string(),
            city_id: city_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_city() {
        let z1 = create_test_zone("z1", "c1", "North");
        let z2 = create_test_zone("z2", "c1", "South");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[z1, z2]])
                .into_connection(),
        );

        let repo = ZoneRepository::new(db);
        let result = repo.find_by_city("c1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|z| z.city_id == "c1"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<zone::Model>::new()])
                .into_connection(),
        );

        let repo = ZoneRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
