//! Issue endpoints.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
};
use elytra_common::{AppError, AppResult};
use elytra_core::{CreateIssueInput, IssueSort, UpdateIssueInput};
use elytra_db::entities::issue::{self, IssueStatus, Priority};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", post(create))
        .route("/{id}", get(get_issue))
        .route("/{id}", put(update))
        .route("/{id}/status", patch(set_status))
        .route("/{id}", delete(delete_issue))
        .route("/user/{user_id}", get(list_by_user))
        .route("/user/{user_id}/stats", get(user_stats))
        .route("/status/{status}", get(list_by_status))
        .route("/status/{status}/count", get(count_by_status))
        .route("/city/{city_id}", get(list_by_city))
}

/// Issue response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub status: IssueStatus,
    pub upvotes: i32,
    pub city_id: Option<String>,
    pub zone_id: Option<String>,
    pub area_id: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub resolved_at: Option<String>,
}

impl From<issue::Model> for IssueResponse {
    fn from(i: issue::Model) -> Self {
        Self {
            id: i.id,
            user_id: i.user_id,
            title: i.title,
            description: i.description,
            category: i.category,
            priority: i.priority,
            status: i.status,
            upvotes: i.upvotes,
            city_id: i.city_id,
            zone_id: i.zone_id,
            area_id: i.area_id,
            created_at: i.created_at.to_rfc3339(),
            updated_at: i.updated_at.map(|t| t.to_rfc3339()),
            resolved_at: i.resolved_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Create issue request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssueRequest {
    pub user_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub priority: Priority,
    pub city_id: Option<String>,
    pub zone_id: Option<String>,
    pub area_id: Option<String>,
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateIssueRequest>,
) -> AppResult<ApiResponse<IssueResponse>> {
    req.validate()?;

    let created = state
        .issue_service
        .create(CreateIssueInput {
            user_id: req.user_id,
            title: req.title,
            description: req.description,
            category: req.category,
            priority: req.priority,
            city_id: req.city_id,
            zone_id: req.zone_id,
            area_id: req.area_id,
        })
        .await?;

    Ok(ApiResponse::ok(created.into()))
}

/// List issues request.
#[derive(Debug, Deserialize)]
pub struct ListIssuesQuery {
    pub sort: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListIssuesQuery>,
) -> AppResult<ApiResponse<Vec<IssueResponse>>> {
    let sort = match query.sort.as_deref() {
        None | Some("recent") => IssueSort::Recent,
        Some("top") => IssueSort::Top,
        Some(other) => {
            return Err(AppError::BadRequest(format!("unknown sort order: {other}")));
        }
    };

    let issues = state.issue_service.list(sort).await?;
    Ok(ApiResponse::ok(issues.into_iter().map(Into::into).collect()))
}

async fn get_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<IssueResponse>> {
    let issue = state.issue_service.get(&id).await?;
    Ok(ApiResponse::ok(issue.into()))
}

/// Update issue request. Every field is overwritten.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIssueRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    pub priority: Priority,
    pub status: IssueStatus,
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateIssueRequest>,
) -> AppResult<ApiResponse<IssueResponse>> {
    req.validate()?;

    let updated = state
        .issue_service
        .update(
            &id,
            UpdateIssueInput {
                title: req.title,
                description: req.description,
                category: req.category,
                priority: req.priority,
                status: req.status,
            },
        )
        .await?;

    Ok(ApiResponse::ok(updated.into()))
}

/// Status transition request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetStatusRequest {
    pub status: IssueStatus,
}

async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SetStatusRequest>,
) -> AppResult<ApiResponse<IssueResponse>> {
    let updated = state.issue_service.set_status(&id, req.status).await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn delete_issue(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.issue_service.delete(&id).await?;
    Ok(ApiResponse::ok(()))
}

async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<Vec<IssueResponse>>> {
    let issues = state.issue_service.list_by_owner(&user_id).await?;
    Ok(ApiResponse::ok(issues.into_iter().map(Into::into).collect()))
}

async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<ApiResponse<Vec<IssueResponse>>> {
    let status = IssueStatus::from_str(&status).map_err(AppError::BadRequest)?;
    let issues = state.issue_service.list_by_status(status).await?;
    Ok(ApiResponse::ok(issues.into_iter().map(Into::into).collect()))
}

async fn count_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> AppResult<ApiResponse<u64>> {
    let status = IssueStatus::from_str(&status).map_err(AppError::BadRequest)?;
    let count = state.issue_service.count_by_status(status).await?;
    Ok(ApiResponse::ok(count))
}

async fn list_by_city(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
) -> AppResult<ApiResponse<Vec<IssueResponse>>> {
    let issues = state.issue_service.list_by_city(&city_id).await?;
    Ok(ApiResponse::ok(issues.into_iter().map(Into::into).collect()))
}

/// Per-user issue counts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIssueStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserIssueStats>> {
    let total = state.issue_service.count_by_owner(&user_id).await?;
    let pending = state
        .issue_service
        .count_by_owner_and_status(&user_id, IssueStatus::Pending)
        .await?;
    let in_progress = state
        .issue_service
        .count_by_owner_and_status(&user_id, IssueStatus::InProgress)
        .await?;
    let resolved = state
        .issue_service
        .count_by_owner_and_status(&user_id, IssueStatus::Resolved)
        .await?;

    Ok(ApiResponse::ok(UserIssueStats {
        total,
        pending,
        in_progress,
        resolved,
    }))
}
