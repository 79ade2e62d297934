//! City endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use elytra_common::AppResult;
use elytra_db::entities::city;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/", post(create))
        .route("/{id}", get(get_city))
        .route("/name/{name}", get(get_by_name))
        .route("/{id}", put(rename))
        .route("/{id}", delete(delete_city))
}

/// City response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CityResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<city::Model> for CityResponse {
    fn from(c: city::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// City name payload, shared by create and rename.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CityNameRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<CityResponse>>> {
    let cities = state.city_service.list().await?;
    Ok(ApiResponse::ok(cities.into_iter().map(Into::into).collect()))
}

async fn get_city(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<CityResponse>> {
    let city = state.city_service.get(&id).await?;
    Ok(ApiResponse::ok(city.into()))
}

async fn get_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<ApiResponse<Option<CityResponse>>> {
    let city = state.city_service.get_by_name(&name).await?;
    Ok(ApiResponse::ok(city.map(Into::into)))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CityNameRequest>,
) -> AppResult<ApiResponse<CityResponse>> {
    req.validate()?;
    let created = state.city_service.create(&req.name).await?;
    Ok(ApiResponse::ok(created.into()))
}

async fn rename(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CityNameRequest>,
) -> AppResult<ApiResponse<CityResponse>> {
    req.validate()?;
    let updated = state.city_service.rename(&id, &req.name).await?;
    Ok(ApiResponse::ok(updated.into()))
}

async fn delete_city(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.city_service.delete(&id).await?;
    Ok(ApiResponse::ok(()))
}
