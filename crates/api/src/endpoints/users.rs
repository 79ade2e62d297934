//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use elytra_common::AppResult;
use elytra_core::RegisterUserInput;
use elytra_db::entities::user::{self, AuthProvider, Role, Status};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(register))
        .route("/", get(list))
        .route("/{id}", get(get_user))
}

/// User response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub status: Status,
    pub provider: AuthProvider,
    pub avatar_url: Option<String>,
    pub email_verified: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            role: u.role,
            status: u.status,
            provider: u.provider,
            avatar_url: u.avatar_url,
            email_verified: u.email_verified,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Register user request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    pub avatar_url: Option<String>,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    req.validate()?;

    let created = state
        .user_service
        .register(RegisterUserInput {
            username: req.username,
            email: req.email,
            avatar_url: req.avatar_url,
        })
        .await?;

    Ok(ApiResponse::ok(created.into()))
}

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<UserResponse>>> {
    let users = state.user_service.list().await?;
    Ok(ApiResponse::ok(users.into_iter().map(Into::into).collect()))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(user.into()))
}
