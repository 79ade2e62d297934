//! HTTP API layer for elytra.
//!
//! A thin REST surface over the core services: request validation,
//! delegation, and error-to-status mapping. Built on Axum 0.8.

pub mod endpoints;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
