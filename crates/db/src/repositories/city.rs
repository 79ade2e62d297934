//! City repository.
//!
//! Mutations commit together with their broadcast notification rows: a
//! location change is never visible without the notifications it owes, and
//! a failed broadcast rolls the mutation back.

use std::sync::Arc;

use crate::entities::{City, Issue, city, issue, notification};
use elytra_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, SqlErr, TransactionTrait, sea_query::Expr,
};

/// City repository for database operations.
#[derive(Clone)]
pub struct CityRepository {
    db: Arc<DatabaseConnection>,
}

impl CityRepository {
    /// Create a new city repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a city by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<city::Model>> {
        City::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a city by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<city::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("City not found: {id}")))
    }

    /// Find a city by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<city::Model>> {
        City::find()
            .filter(city::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a city with this name exists.
    pub async fn exists_by_name(&self, name: &str) -> AppResult<bool> {
        Ok(City::find()
            .filter(city::Column::Name.eq(name))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            > 0)
    }

    /// Get all cities, by name.
    pub async fn find_all(&self) -> AppResult<Vec<city::Model>> {
        City::find()
            .order_by_asc(city::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a city and its broadcast notifications in one transaction.
    pub async fn create_with_broadcast(
        &self,
        model: city::ActiveModel,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<city::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("City already exists with this name".to_string())
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
        model: city::ActiveModel,
        notifications: Vec<notification::ActiveModel>,
    ) -> AppResult<city::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = model.update(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("City already exists with this name".to_string())
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

    /// Delete a city in one transaction: clear the location tags of issues
    /// referencing it (the issues themselves survive), remove the city, then
    /// persist the broadcast notifications. Zones and areas under the city
    /// are removed by their cascade constraints.
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
            .col_expr(issue::Column::CityId, Expr::value(None::<String>))
            .col_expr(issue::Column::ZoneId, Expr::value(None::<String>))
            .col_expr(issue::Column::AreaId, Expr::value(None::<String>))
            .filter(issue::Column::CityId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        City::delete_by_id(id)
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
