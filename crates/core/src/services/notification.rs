//! Notification service.

use elytra_common::{AppError, AppResult, IdGenerator};
use elytra_db::{
    entities::issue::IssueStatus,
    entities::notification::{self, NotificationType},
    repositories::{IssueRepository, NotificationRepository, UserRepository},
};
use sea_orm::Set;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    issue_repo: IssueRepository,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        issue_repo: IssueRepository,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            issue_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Message and type for a status transition. Total over `IssueStatus`.
    #[must_use]
    pub const fn status_message(status: IssueStatus) -> (&'static str, NotificationType) {
        match status {
            IssueStatus::InProgress => (
                "Your issue is now being addressed by our team.",
                NotificationType::IssueInProgress,
            ),
            IssueStatus::Resolved => (
                "Your issue has been resolved. Thank you for your report!",
                NotificationType::IssueResolved,
            ),
            IssueStatus::Pending => (
                "Your issue status has been updated.",
                NotificationType::IssueUpdate,
            ),
        }
    }

    /// Create a notification for a user.
    ///
    /// Validates the recipient and, when supplied, the referenced issue.
    pub async fn notify(
        &self,
        user_id: &str,
        issue_id: Option<&str>,
        message: &str,
        notification_type: NotificationType,
    ) -> AppResult<notification::Model> {
        self.user_repo.get_by_id(user_id).await?;
        if let Some(issue_id) = issue_id {
            self.issue_repo.get_by_id(issue_id).await?;
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            issue_id: Set(issue_id.map(ToString::to_string)),
            message: Set(message.to_string()),
            notification_type: Set(notification_type),
            is_read: Set(false),
            ..Default::default()
        };

        self.notification_repo.create(model).await
    }

    /// Notify an issue's owner about a status transition.
    ///
    /// Callers invoke this only on effective changes; the recipient and issue
    /// are already resolved by then, so no re-validation happens here.
    pub async fn notify_status_change(
        &self,
        owner_id: &str,
        issue_id: &str,
        new_status: IssueStatus,
    ) -> AppResult<notification::Model> {
        let (message, notification_type) = Self::status_message(new_status);

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(owner_id.to_string()),
            issue_id: Set(Some(issue_id.to_string())),
            message: Set(message.to_string()),
            notification_type: Set(notification_type),
            is_read: Set(false),
            ..Default::default()
        };

        self.notification_repo.create(model).await
    }

    /// Build one unread notification row per existing user.
    ///
    /// Used by the location services to hand a pre-built batch into the
    /// repository transaction that also applies the mutation.
    pub async fn broadcast_models(
        &self,
        message: &str,
        notification_type: NotificationType,
    ) -> AppResult<Vec<notification::ActiveModel>> {
        let users = self.user_repo.find_all().await?;

        Ok(users
            .into_iter()
            .map(|user| notification::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user.id),
                issue_id: Set(None),
                message: Set(message.to_string()),
                notification_type: Set(notification_type),
                is_read: Set(false),
                ..Default::default()
            })
            .collect())
    }

    /// Send a notification to every user as a single batched insert.
    pub async fn broadcast(
        &self,
        message: &str,
        notification_type: NotificationType,
    ) -> AppResult<u64> {
        let models = self.broadcast_models(message, notification_type).await?;
        let count = models.len() as u64;
        self.notification_repo.insert_many(models).await?;

        tracing::debug!(recipients = count, "Broadcast notification sent");
        Ok(count)
    }

    /// Get notifications for a user, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<notification::Model>> {
        self.notification_repo.find_by_user(user_id, false).await
    }

    /// Get unread notifications for a user, newest first.
    pub async fn list_unread_for_user(&self, user_id: &str) -> AppResult<Vec<notification::Model>> {
        self.notification_repo.find_by_user(user_id, true).await
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark a notification as read. Idempotent once read.
    pub async fn mark_read(&self, id: &str) -> AppResult<notification::Model> {
        self.notification_repo.mark_as_read(id).await
    }

    /// Delete a notification.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        if self.notification_repo.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound(format!("Notification not found: {id}")));
        }
        self.notification_repo.delete(id).await
    }
}
