//! Upvote endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use elytra_common::AppResult;
use elytra_db::entities::upvote;
use serde::{Deserialize, Serialize};

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add))
        .route("/", delete(remove))
        .route("/check", get(check))
        .route("/count/{issue_id}", get(count))
}

/// Upvote request, naming both sides of the pair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteRequest {
    pub user_id: String,
    pub issue_id: String,
}

/// Upvote response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpvoteResponse {
    pub id: String,
    pub user_id: String,
    pub issue_id: String,
    pub created_at: String,
}

impl From<upvote::Model> for UpvoteResponse {
    fn from(u: upvote::Model) -> Self {
        Self {
            id: u.id,
            user_id: u.user_id,
            issue_id: u.issue_id,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

async fn add(
    State(state): State<AppState>,
    Json(req): Json<UpvoteRequest>,
) -> AppResult<ApiResponse<UpvoteResponse>> {
    let created = state
        .upvote_service
        .add(&req.user_id, &req.issue_id)
        .await?;
    Ok(ApiResponse::ok(created.into()))
}

async fn remove(
    State(state): State<AppState>,
    Json(req): Json<UpvoteRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .upvote_service
        .remove(&req.user_id, &req.issue_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Upvote check query.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    pub user_id: String,
    pub issue_id: String,
}

/// Upvote check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub has_upvoted: bool,
}

async fn check(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> AppResult<ApiResponse<CheckResponse>> {
    let has_upvoted = state
        .upvote_service
        .has_upvoted(&query.user_id, &query.issue_id)
        .await?;
    Ok(ApiResponse::ok(CheckResponse { has_upvoted }))
}

/// Upvote count response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResponse {
    pub count: u64,
}

async fn count(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
) -> AppResult<ApiResponse<CountResponse>> {
    let count = state.upvote_service.count_for_issue(&issue_id).await?;
    Ok(ApiResponse::ok(CountResponse { count }))
}
