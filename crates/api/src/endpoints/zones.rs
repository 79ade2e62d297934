//! Zone endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use elytra_common::AppResult;
use elytra_db::entities::zone;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/{id}", get(get_zone))
        .route("/city/{city_id}", get(list_by_city))
        .route("/{id}", put(rename))
        .route("/{id}", delete(delete_zone))
}

/// Zone response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneResponse {
    pub id: String,
    pub city_id: String,
    pub name: String,
    pub created_at: String,
}

impl From<zone::Model> for ZoneResponse {
    fn from(z: zone::Model) -> Self {
        Self {
            id: z.id,
            city_id: z.city_id,
            name: z.name,
            created_at: z.created_at.to_rfc3339(),
        }
    }
}

/// Create zone request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateZoneRequest {
    pub city_id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Rename zone request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameZoneRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

async fn get_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ZoneResponse>> {
    let zone = state.zone_service.get(&id).await?;
    Ok(ApiResponse::ok(zone.into()))
}

async fn list_by_city(
    State(state): State<AppState>,
    Path(city_id): Path<String>,
) -> AppResult<ApiResponse<Vec<ZoneResponse>>> {
    let zones = state.zone_service.list_by_city(&city_id).await?;
    Ok(ApiResponse::ok(zones.into_iter().map(Into::into).collect()))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateZoneRequest>,
) -> AppResult<ApiResponse<ZoneResponse>> {
    req.validate()?;
    let created = state.zone_service.create(&req.city_id, &req.name).await?;
    Ok(ApiResponse::ok(created.into()))
}

async fn rename(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameZoneRequest>,
) -> AppResult<ApiResponse<ZoneResponse>> {
    req.validate()?;
    let updated = state.zone_service.rename(&id, &req.name).await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn delete_zone(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.zone_service.delete(&id).await?;
    Ok(ApiResponse::ok(()))
}
