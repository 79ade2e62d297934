//! Issue lifecycle service.
//!
//! Issues are created pending with a zero upvote count. Status transitions
//! are the only writes that notify the owner, and a transition to the same
//! status is a pure no-op.

use chrono::Utc;
use elytra_common::{AppResult, IdGenerator};
use elytra_db::{
    entities::issue::{self, IssueStatus, Priority},
    repositories::{
        AreaRepository, CityRepository, IssueRepository, UserRepository, ZoneRepository,
    },
};
use sea_orm::{IntoActiveModel, Set};

use crate::services::notification::NotificationService;

/// Input for creating an issue.
#[derive(Debug, Clone)]
pub struct CreateIssueInput {
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub city_id: Option<String>,
    pub zone_id: Option<String>,
    pub area_id: Option<String>,
}

/// Input for updating an issue. Every field is overwritten.
#[derive(Debug, Clone)]
pub struct UpdateIssueInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub status: IssueStatus,
}

/// Sort order for issue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueSort {
    /// Newest first.
    #[default]
    Recent,
    /// Most upvoted first, newest breaking ties.
    Top,
}

/// Issue service for business logic.
#[derive(Clone)]
pub struct IssueService {
    issue_repo: IssueRepository,
    user_repo: UserRepository,
    city_repo: CityRepository,
    zone_repo: ZoneRepository,
    area_repo: AreaRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl IssueService {
    /// Create a new issue service.
    #[must_use]
    pub const fn new(
        issue_repo: IssueRepository,
        user_repo: UserRepository,
        city_repo: CityRepository,
        zone_repo: ZoneRepository,
        area_repo: AreaRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            issue_repo,
            user_repo,
            city_repo,
            zone_repo,
            area_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an issue in the pending state.
    pub async fn create(&self, input: CreateIssueInput) -> AppResult<issue::Model> {
        self.user_repo.get_by_id(&input.user_id).await?;
        self.resolve_locations(
            input.city_id.as_deref(),
            input.zone_id.as_deref(),
            input.area_id.as_deref(),
        )
        .await?;

        let model = issue::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(input.user_id),
            title: Set(input.title),
            description: Set(input.description),
            category: Set(input.category),
            priority: Set(input.priority),
            status: Set(IssueStatus::Pending),
            upvotes: Set(0),
            city_id: Set(input.city_id),
            zone_id: Set(input.zone_id),
            area_id: Set(input.area_id),
            ..Default::default()
        };

        let created = self.issue_repo.create(model).await?;
        tracing::info!(issue_id = %created.id, user_id = %created.user_id, "Issue created");
        Ok(created)
    }

    /// Overwrite an issue's editable fields.
    ///
    /// Status handling matches `set_status`: an effective status change stamps
    /// `resolved_at` on the first resolution and notifies the owner.
    pub async fn update(&self, issue_id: &str, input: UpdateIssueInput) -> AppResult<issue::Model> {
        let existing = self.issue_repo.get_by_id(issue_id).await?;
        let previous_status = existing.status;
        let owner_id = existing.user_id.clone();
        let already_resolved = existing.resolved_at.is_some();

        let mut model = existing.into_active_model();
        model.title = Set(input.title);
        model.description = Set(input.description);
        model.category = Set(input.category);
        model.priority = Set(input.priority);

        if input.status == previous_status {
            model.updated_at = Set(Some(Utc::now().into()));
            return self.issue_repo.update(model).await;
        }

        self.commit_transition(model, issue_id, &owner_id, input.status, already_resolved)
            .await
    }

    /// Transition an issue to a new status.
    ///
    /// A same-status transition performs no write at all. An effective change
    /// bumps `updated_at`, stamps `resolved_at` on the first resolution, and
    /// notifies the owner.
    pub async fn set_status(
        &self,
        issue_id: &str,
        new_status: IssueStatus,
    ) -> AppResult<issue::Model> {
        let existing = self.issue_repo.get_by_id(issue_id).await?;
        if existing.status == new_status {
            return Ok(existing);
        }

        let owner_id = existing.user_id.clone();
        let already_resolved = existing.resolved_at.is_some();

        let updated = self
            .commit_transition(
                existing.into_active_model(),
                issue_id,
                &owner_id,
                new_status,
                already_resolved,
            )
            .await?;

        tracing::info!(issue_id = %issue_id, status = ?new_status, "Issue status changed");
        Ok(updated)
    }

    /// Save an effective status change and notify the owner.
    ///
    /// Bumps `updated_at` and stamps `resolved_at` on the first transition
    /// to resolved. `resolved_at` is never overwritten or cleared.
    async fn commit_transition(
        &self,
        mut model: issue::ActiveModel,
        issue_id: &str,
        owner_id: &str,
        new_status: IssueStatus,
        already_resolved: bool,
    ) -> AppResult<issue::Model> {
        model.status = Set(new_status);
        model.updated_at = Set(Some(Utc::now().into()));
        if new_status == IssueStatus::Resolved && !already_resolved {
            model.resolved_at = Set(Some(Utc::now().into()));
        }

        let updated = self.issue_repo.update(model).await?;

        self.notifications
            .notify_status_change(owner_id, issue_id, new_status)
            .await?;

        Ok(updated)
    }

    /// Delete an issue. Upvotes and notifications referencing it are removed
    /// by their cascade constraints.
    pub async fn delete(&self, issue_id: &str) -> AppResult<()> {
        self.issue_repo.get_by_id(issue_id).await?;
        self.issue_repo.delete(issue_id).await
    }

    /// Get an issue by ID.
    pub async fn get(&self, issue_id: &str) -> AppResult<issue::Model> {
        self.issue_repo.get_by_id(issue_id).await
    }

    /// List all issues in the requested order.
    pub async fn list(&self, sort: IssueSort) -> AppResult<Vec<issue::Model>> {
        match sort {
            IssueSort::Recent => self.issue_repo.find_all_recent().await,
            IssueSort::Top => self.issue_repo.find_all_by_upvotes().await,
        }
    }

    /// List issues reported by a user, newest first.
    pub async fn list_by_owner(&self, user_id: &str) -> AppResult<Vec<issue::Model>> {
        self.issue_repo.find_by_user(user_id).await
    }

    /// List issues in a status, newest first.
    pub async fn list_by_status(&self, status: IssueStatus) -> AppResult<Vec<issue::Model>> {
        self.issue_repo.find_by_status(status).await
    }

    /// List issues tagged with a city, newest first.
    pub async fn list_by_city(&self, city_id: &str) -> AppResult<Vec<issue::Model>> {
        self.issue_repo.find_by_city(city_id).await
    }

    /// Count issues reported by a user.
    pub async fn count_by_owner(&self, user_id: &str) -> AppResult<u64> {
        self.issue_repo.count_by_user(user_id).await
    }

    /// Count a user's issues in a status.
    pub async fn count_by_owner_and_status(
        &self,
        user_id: &str,
        status: IssueStatus,
    ) -> AppResult<u64> {
        self.issue_repo.count_by_user_and_status(user_id, status).await
    }

    /// Count issues in a status.
    pub async fn count_by_status(&self, status: IssueStatus) -> AppResult<u64> {
        self.issue_repo.count_by_status(status).await
    }

    async fn resolve_locations(
        &self,
        city_id: Option<&str>,
        zone_id: Option<&str>,
        area_id: Option<&str>,
    ) -> AppResult<()> {
        if let Some(city_id) = city_id {
            self.city_repo.get_by_id(city_id).await?;
        }
        if let Some(zone_id) = zone_id {
            self.zone_repo.get_by_id(zone_id).await?;
        }
        if let Some(area_id) = area_id {
            self.area_repo.get_by_id(area_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::NotificationService;
    use chrono::Utc;
    use elytra_common::AppError;
    use elytra_db::entities::{notification, user};
    use elytra_db::repositories::NotificationRepository;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: format!("user_{id}"),
            email: format!("{id}@example.com"),
            role: user::Role::User,
            status: user::Status::Active,
            provider: user::AuthProvider::Local,
            provider_id: None,
            avatar_url: None,
            email_verified: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_issue(id: &str, user_id: &str, status: IssueStatus) -> issue::Model {
        issue::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: "Pothole on Main St".to_string(),
            description: "Deep pothole near the intersection".to_string(),
            category: "roads".to_string(),
            priority: Priority::Medium,
            status,
            upvotes: 0,
            city_id: None,
            zone_id: None,
            area_id: None,
            created_at: Utc::now().into(),
            updated_at: None,
            resolved_at: None,
        }
    }

    fn create_test_notification(id: &str, user_id: &str, issue_id: &str) -> notification::Model {
        notification::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            issue_id: Some(issue_id.to_string()),
            message: "Your issue has been resolved. Thank you for your report!".to_string(),
            notification_type: notification::NotificationType::IssueResolved,
            is_read: false,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> IssueService {
        IssueService::new(
            IssueRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            CityRepository::new(db.clone()),
            ZoneRepository::new(db.clone()),
            AreaRepository::new(db.clone()),
            NotificationService::new(
                NotificationRepository::new(db.clone()),
                UserRepository::new(db.clone()),
                IssueRepository::new(db),
            ),
        )
    }

    #[tokio::test]
    async fn test_create_unknown_user_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .create(CreateIssueInput {
                user_id: "ghost".to_string(),
                title: "Pothole".to_string(),
                description: "Deep pothole".to_string(),
                category: "roads".to_string(),
                priority: Priority::Low,
                city_id: None,
                zone_id: None,
                area_id: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_set_status_same_status_is_noop() {
        let existing = create_test_issue("i1", "u1", IssueStatus::Pending);

        // Only the lookup query is mocked; a save or notification insert
        // would exhaust the mock and fail the test.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing.clone()]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .set_status("i1", IssueStatus::Pending)
            .await
            .unwrap();

        assert_eq!(result.status, IssueStatus::Pending);
        assert!(result.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_set_status_change_notifies_owner() {
        let existing = create_test_issue("i1", "u1", IssueStatus::InProgress);
        let mut resolved = create_test_issue("i1", "u1", IssueStatus::Resolved);
        resolved.resolved_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![existing]])
                .append_query_results([vec![resolved]])
                .append_query_results([vec![create_test_notification("n1", "u1", "i1")]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.set_status("i1", IssueStatus::Resolved).await.unwrap();

        assert_eq!(result.status, IssueStatus::Resolved);
        assert!(result.resolved_at.is_some());
    }

    #[tokio::test]
    async fn test_update_status_change_notifies_owner() {
        let existing = create_test_issue("i1", "u1", IssueStatus::InProgress);
        let mut resolved = create_test_issue("i1", "u1", IssueStatus::Resolved);
        resolved.resolved_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![existing]])
                .append_query_results([vec![resolved]])
                .append_query_results([vec![create_test_notification("n1", "u1", "i1")]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .update(
                "i1",
                UpdateIssueInput {
                    title: "Pothole on Main St".to_string(),
                    description: "Filled in but reopened".to_string(),
                    category: "roads".to_string(),
                    priority: Priority::High,
                    status: IssueStatus::Resolved,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status, IssueStatus::Resolved);
        assert!(result.resolved_at.is_some());
    }

    #[tokio::test]
    async fn test_update_same_status_skips_notification() {
        let existing = create_test_issue("i1", "u1", IssueStatus::Pending);
        let mut saved = create_test_issue("i1", "u1", IssueStatus::Pending);
        saved.updated_at = Some(Utc::now().into());

        // Lookup and save only; a notification insert would exhaust the mock
        // and fail the test.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![existing]])
                .append_query_results([vec![saved]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service
            .update(
                "i1",
                UpdateIssueInput {
                    title: "Pothole on Main St".to_string(),
                    description: "Still there".to_string(),
                    category: "roads".to_string(),
                    priority: Priority::Medium,
                    status: IssueStatus::Pending,
                },
            )
            .await
            .unwrap();

        assert_eq!(result.status, IssueStatus::Pending);
        assert!(result.resolved_at.is_none());
    }

    #[tokio::test]
    async fn test_delete_missing_issue_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<issue::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.delete("missing").await;

        assert!(matches!(result, Err(AppError::IssueNotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_existing_issue() {
        let existing = create_test_issue("i1", "u1", IssueStatus::Pending);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        assert!(service.delete("i1").await.is_ok());
    }
}
