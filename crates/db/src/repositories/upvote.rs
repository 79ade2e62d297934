//! Upvote repository.
//!
//! The write paths pair the ledger row mutation with the denormalized counter
//! update on the issue inside one transaction, so readers never observe a
//! counter inconsistent with the ledger.

use std::sync::Arc;

use crate::entities::{Issue, Upvote, issue, upvote};
use elytra_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    SqlErr, TransactionTrait, sea_query::Expr,
};

/// Upvote repository for database operations.
#[derive(Clone)]
pub struct UpvoteRepository {
    db: Arc<DatabaseConnection>,
}

impl UpvoteRepository {
    /// Create a new upvote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an upvote by user and issue.
    pub async fn find_by_user_and_issue(
        &self,
        user_id: &str,
        issue_id: &str,
    ) -> AppResult<Option<upvote::Model>> {
        Upvote::find()
            .filter(upvote::Column::UserId.eq(user_id))
            .filter(upvote::Column::IssueId.eq(issue_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has upvoted an issue.
    pub async fn has_upvoted(&self, user_id: &str, issue_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_issue(user_id, issue_id)
            .await?
            .is_some())
    }

    /// Insert an upvote row and increment the issue's counter in one
    /// transaction.
    ///
    /// The UNIQUE (`user_id`, `issue_id`) index is the real guard against
    /// double-voting: when two concurrent inserts race for the same pair,
    /// exactly one commits and the other surfaces as `Conflict` here.
    pub async fn insert_with_count(&self, model: upvote::ActiveModel) -> AppResult<upvote::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let issue_id = match &model.issue_id {
            sea_orm::ActiveValue::Set(id) => id.clone(),
            _ => return Err(AppError::Internal("upvote issue_id not set".to_string())),
        };

        let created = model.insert(&txn).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("User has already upvoted this issue".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })?;

        Issue::update_many()
            .col_expr(
                issue::Column::Upvotes,
                Expr::col(issue::Column::Upvotes).add(1),
            )
            .filter(issue::Column::Id.eq(&issue_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Delete the upvote row for (user, issue) and decrement the issue's
    /// counter in one transaction. The decrement is clamped at zero so a
    /// previously inconsistent counter can never go negative.
    pub async fn delete_with_count(&self, user_id: &str, issue_id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let deleted = Upvote::delete_many()
            .filter(upvote::Column::UserId.eq(user_id))
            .filter(upvote::Column::IssueId.eq(issue_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected == 0 {
            return Err(AppError::NotFound("Upvote not found".to_string()));
        }

        Issue::update_many()
            .col_expr(
                issue::Column::Upvotes,
                Expr::cust("GREATEST(upvotes - 1, 0)"),
            )
            .filter(issue::Column::Id.eq(issue_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Count upvotes on an issue from the ledger rows.
    pub async fn count_by_issue(&self, issue_id: &str) -> AppResult<u64> {
        Upvote::find()
            .filter(upvote::Column::IssueId.eq(issue_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_upvote(id: &str, user_id: &str, issue_id: &str) -> upvote::Model {
        upvote::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            issue_id: issue_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_has_upvoted_true() {
        let upvote = create_test_upvote("v1", "u1", "i1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[upvote]])
                .into_connection(),
        );

        let repo = UpvoteRepository::new(db);
        assert!(repo.has_upvoted("u1", "i1").await.unwrap());
    }

    #[tokio::test]
    async fn test_has_upvoted_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<upvote::Model>::new()])
                .into_connection(),
        );

        let repo = UpvoteRepository::new(db);
        assert!(!repo.has_upvoted("u1", "i1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_with_count_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = UpvoteRepository::new(db);
        let result = repo.delete_with_count("u1", "i1").await;

        match result {
            Err(AppError::NotFound(msg)) => assert!(msg.contains("Upvote not found")),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[tokio::test]
    async fn test_delete_with_count_deletes_and_decrements() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    // delete of the ledger row
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    // clamped counter decrement
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = UpvoteRepository::new(db);
        repo.delete_with_count("u1", "i1").await.unwrap();
    }
}
