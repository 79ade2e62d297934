//! Area endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use elytra_common::AppResult;
use elytra_db::entities::area;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_area))
        .route("/zone/{zone_id}", get(list_by_zone))
        .route("/{id}", put(rename))
        .route("/{id}", delete(delete_area))
}

/// Area response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaResponse {
    pub id: String,
    pub zone_id: String,
    pub name: String,
    pub created_at: String,
}

impl From<area::Model> for AreaResponse {
    fn from(a: area::Model) -> Self {
        Self {
            id: a.id,
            zone_id: a.zone_id,
            name: a.name,
            created_at: a.created_at.to_rfc3339(),
        }
    }
}

/// Create area request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAreaRequest {
    pub zone_id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Rename area request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameAreaRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

async fn get_area(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<AreaResponse>> {
    let area = state.area_service.get(&id).await?;
    Ok(ApiResponse::ok(area.into()))
}

async fn list_by_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<String>,
) -> AppResult<ApiResponse<Vec<AreaResponse>>> {
    let areas = state.area_service.list_by_zone(&zone_id).await?;
    Ok(ApiResponse::ok(areas.into_iter().map(Into::into).collect()))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateAreaRequest>,
) -> AppResult<ApiResponse<AreaResponse>> {
    req.validate()?;
    let created = state.area_service.create(&req.zone_id, &req.name).await?;
    Ok(ApiResponse::ok(created.into()))
}

async fn rename(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameAreaRequest>,
) -> AppResult<ApiResponse<AreaResponse>> {
    req.validate()?;
    let updated = state.area_service.rename(&id, &req.name).await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn delete_area(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.area_service.delete(&id).await?;
    Ok(ApiResponse::ok(()))
}
