//! Upvote service.
//!
//! Each (user, issue) pair carries at most one upvote. The ledger row and
//! the denormalized counter on the issue move together in one transaction,
//! so the counter always equals the number of rows.

use elytra_common::{AppError, AppResult, IdGenerator};
use elytra_db::{
    entities::upvote,
    repositories::{IssueRepository, UpvoteRepository, UserRepository},
};
use sea_orm::Set;

/// Upvote service for business logic.
#[derive(Clone)]
pub struct UpvoteService {
    upvote_repo: UpvoteRepository,
    issue_repo: IssueRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UpvoteService {
    /// Create a new upvote service.
    #[must_use]
    pub const fn new(
        upvote_repo: UpvoteRepository,
        issue_repo: IssueRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            upvote_repo,
            issue_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add an upvote from a user to an issue.
    ///
    /// Fails with Conflict if the user has already upvoted. Under a
    /// concurrent race the unique index lets exactly one insert through and
    /// the loser surfaces the same Conflict.
    pub async fn add(&self, user_id: &str, issue_id: &str) -> AppResult<upvote::Model> {
        self.user_repo.get_by_id(user_id).await?;
        self.issue_repo.get_by_id(issue_id).await?;

        if self.upvote_repo.has_upvoted(user_id, issue_id).await? {
            return Err(AppError::Conflict(
                "User has already upvoted this issue".to_string(),
            ));
        }

        let model = upvote::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            issue_id: Set(issue_id.to_string()),
            ..Default::default()
        };

        let created = self.upvote_repo.insert_with_count(model).await?;
        tracing::debug!(user_id = %user_id, issue_id = %issue_id, "Upvote added");
        Ok(created)
    }

    /// Remove a user's upvote from an issue.
    ///
    /// Fails with NotFound if no upvote exists. The counter decrement is
    /// clamped at zero.
    pub async fn remove(&self, user_id: &str, issue_id: &str) -> AppResult<()> {
        self.upvote_repo.delete_with_count(user_id, issue_id).await?;
        tracing::debug!(user_id = %user_id, issue_id = %issue_id, "Upvote removed");
        Ok(())
    }

    /// Check whether a user has upvoted an issue.
    pub async fn has_upvoted(&self, user_id: &str, issue_id: &str) -> AppResult<bool> {
        self.upvote_repo.has_upvoted(user_id, issue_id).await
    }

    /// Count upvote rows for an issue from the ledger itself.
    pub async fn count_for_issue(&self, issue_id: &str) -> AppResult<u64> {
        self.upvote_repo.count_by_issue(issue_id).await
    }
}
