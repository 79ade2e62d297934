//! User service.
//!
//! Minimal identity surface. Credentials and sessions are out of scope;
//! callers identify users by id.

use elytra_common::{AppError, AppResult, IdGenerator};
use elytra_db::{
    entities::user::{self, AuthProvider, Role, Status},
    repositories::UserRepository,
};
use sea_orm::Set;

/// Input for registering a user.
#[derive(Debug, Clone)]
pub struct RegisterUserInput {
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a user with a unique username and email.
    pub async fn register(&self, input: RegisterUserInput) -> AppResult<user::Model> {
        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Username is already taken".to_string()));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".to_string()));
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            email: Set(input.email),
            role: Set(Role::User),
            status: Set(Status::Active),
            provider: Set(AuthProvider::Local),
            avatar_url: Set(input.avatar_url),
            email_verified: Set(false),
            ..Default::default()
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, username = %created.username, "User registered");
        Ok(created)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get all users.
    pub async fn list(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_all().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            role: Role::User,
            status: Status::Active,
            provider: AuthProvider::Local,
            provider_id: None,
            avatar_url: None,
            email_verified: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_register_duplicate_username_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_user("u1", "alice")]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let result = service
            .register(RegisterUserInput {
                username: "alice".to_string(),
                email: "other@example.com".to_string(),
                avatar_url: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_creates_active_local_user() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([vec![create_test_user("u1", "alice")]])
                .into_connection(),
        );

        let service = UserService::new(UserRepository::new(db));
        let created = service
            .register(RegisterUserInput {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                avatar_url: None,
            })
            .await
            .unwrap();

        assert_eq!(created.username, "alice");
        assert_eq!(created.status, Status::Active);
    }
}
