//! API endpoints.

mod areas;
mod cities;
mod health;
mod issues;
mod notifications;
mod upvotes;
mod users;
mod zones;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/issues", issues::router())
        .nest("/upvotes", upvotes::router())
        .nest("/notifications", notifications::router())
        .nest("/cities", cities::router())
        .nest("/zones", zones::router())
        .nest("/areas", areas::router())
        .nest("/health", health::router())
}
