//! Issue repository.

use std::sync::Arc;

use crate::entities::{Issue, issue};
use elytra_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

/// Issue repository for database operations.
#[derive(Clone)]
pub struct IssueRepository {
    db: Arc<DatabaseConnection>,
}

impl IssueRepository {
    /// Create a new issue repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an issue by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<issue::Model>> {
        Issue::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an issue by ID, failing if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<issue::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::IssueNotFound(id.to_string()))
    }

    /// Create a new issue.
    pub async fn create(&self, model: issue::ActiveModel) -> AppResult<issue::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an issue.
    pub async fn update(&self, model: issue::ActiveModel) -> AppResult<issue::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an issue. Dependent upvote rows are removed by the
    /// `ON DELETE CASCADE` constraint on the upvote table.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let issue = self.find_by_id(id).await?;
        if let Some(i) = issue {
            i.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Get all issues, newest first.
    pub async fn find_all_recent(&self) -> AppResult<Vec<issue::Model>> {
        Issue::find()
            .order_by_desc(issue::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get all issues ranked by popularity: upvotes descending, ties broken
    /// by creation time descending.
    pub async fn find_all_by_upvotes(&self) -> AppResult<Vec<issue::Model>> {
        Issue::find()
            .order_by_desc(issue::Column::Upvotes)
            .order_by_desc(issue::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get issues reported by a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<issue::Model>> {
        Issue::find()
            .filter(issue::Column::UserId.eq(user_id))
            .order_by_desc(issue::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get issues with the given status.
    pub async fn find_by_status(&self, status: issue::IssueStatus) -> AppResult<Vec<issue::Model>> {
        Issue::find()
            .filter(issue::Column::Status.eq(status))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get issues tagged to a city.
    pub async fn find_by_city(&self, city_id: &str) -> AppResult<Vec<issue::Model>> {
        Issue::find()
            .filter(issue::Column::CityId.eq(city_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count issues reported by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Issue::find()
            .filter(issue::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count issues reported by a user with the given status.
    pub async fn count_by_user_and_status(
        &self,
        user_id: &str,
        status: issue::IssueStatus,
    ) -> AppResult<u64> {
        Issue::find()
            .filter(issue::Column::UserId.eq(user_id))
            .filter(issue::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count issues with the given status.
    pub async fn count_by_status(&self, status: issue::IssueStatus) -> AppResult<u64> {
        Issue::find()
            .filter(issue::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
