//! City service.
//!
//! Every city mutation is announced to all users. The broadcast rows are
//! built here and handed to the repository so they commit in the same
//! transaction as the mutation itself.

use elytra_common::{AppError, AppResult, IdGenerator};
use elytra_db::{
    entities::{city, notification::NotificationType},
    repositories::CityRepository,
};
use sea_orm::{IntoActiveModel, Set};

use crate::services::notification::NotificationService;

/// City service for business logic.
#[derive(Clone)]
pub struct CityService {
    city_repo: CityRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl CityService {
    /// Create a new city service.
    #[must_use]
    pub const fn new(city_repo: CityRepository, notifications: NotificationService) -> Self {
        Self {
            city_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get all cities.
    pub async fn list(&self) -> AppResult<Vec<city::Model>> {
        self.city_repo.find_all().await
    }

    /// Get a city by ID.
    pub async fn get(&self, id: &str) -> AppResult<city::Model> {
        self.city_repo.get_by_id(id).await
    }

    /// Get a city by name.
    pub async fn get_by_name(&self, name: &str) -> AppResult<Option<city::Model>> {
        self.city_repo.find_by_name(name).await
    }

    /// Create a city and announce it to all users.
    pub async fn create(&self, name: &str) -> AppResult<city::Model> {
        if self.city_repo.exists_by_name(name).await? {
            return Err(AppError::Conflict(format!(
                "City already exists with name: {name}"
            )));
        }

        let model = city::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name.to_string()),
            ..Default::default()
        };

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("New city added: {name}"),
                NotificationType::SystemAnnouncement,
            )
            .await?;

        let created = self
            .city_repo
            .create_with_broadcast(model, broadcast)
            .await?;

        tracing::info!(city_id = %created.id, name = %created.name, "City created");
        Ok(created)
    }

    /// Rename a city and announce the change to all users.
    pub async fn rename(&self, id: &str, name: &str) -> AppResult<city::Model> {
        let existing = self.city_repo.get_by_id(id).await?;
        let old_name = existing.name.clone();

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("City updated: {old_name} → {name}"),
                NotificationType::SystemAnnouncement,
            )
            .await?;

        self.city_repo.update_with_broadcast(model, broadcast).await
    }

    /// Delete a city and announce the removal to all users.
    ///
    /// Issues tagged with the city keep existing; their city, zone, and area
    /// references are cleared in the same transaction.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let existing = self.city_repo.get_by_id(id).await?;

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("City removed: {}", existing.name),
                NotificationType::SystemAnnouncement,
            )
            .await?;

        self.city_repo.delete_with_broadcast(id, broadcast).await?;

        tracing::info!(city_id = %id, name = %existing.name, "City deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use elytra_db::entities::user;
    use elytra_db::repositories::{IssueRepository, NotificationRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn create_test_city(id: &str, name: &str) -> city::Model {
        city::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

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

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> CityService {
        CityService::new(
            CityRepository::new(db.clone()),
            NotificationService::new(
                NotificationRepository::new(db.clone()),
                UserRepository::new(db.clone()),
                IssueRepository::new(db),
            ),
        )
    }

    #[tokio::test]
    async fn test_create_duplicate_name_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create("Springfield").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_broadcasts_to_all_users() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // duplicate-name check
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                // user listing for the broadcast batch
                .append_query_results([vec![create_test_user("u1"), create_test_user("u2")]])
                // insert returning the city
                .append_query_results([vec![create_test_city("c1", "Springfield")]])
                // batched notification insert
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 2,
                }])
                .into_connection(),
        );

        let service = service_with(db);
        let created = service.create("Springfield").await.unwrap();

        assert_eq!(created.name, "Springfield");
    }

    #[tokio::test]
    async fn test_delete_missing_city_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<city::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.delete("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
