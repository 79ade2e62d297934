//! Notification endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{delete, get, patch},
};
use elytra_common::AppResult;
use elytra_db::entities::notification::{self, NotificationType};
use serde::Serialize;

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/{user_id}", get(list_for_user))
        .route("/user/{user_id}/unread", get(list_unread))
        .route("/user/{user_id}/unread-count", get(unread_count))
        .route("/{id}/read", patch(mark_read))
        .route("/{id}", delete(delete_notification))
}

/// Notification response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    pub issue_id: Option<String>,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            issue_id: n.issue_id,
            message: n.message,
            notification_type: n.notification_type,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let notifications = state.notification_service.list_for_user(&user_id).await?;
    Ok(ApiResponse::ok(
        notifications.into_iter().map(Into::into).collect(),
    ))
}

async fn list_unread(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list_unread_for_user(&user_id)
        .await?;
    Ok(ApiResponse::ok(
        notifications.into_iter().map(Into::into).collect(),
    ))
}

/// Unread count response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: u64,
}

async fn unread_count(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.count_unread(&user_id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<NotificationResponse>> {
    let updated = state.notification_service.mark_read(&id).await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.notification_service.delete(&id).await?;
    Ok(ApiResponse::ok(()))
}
