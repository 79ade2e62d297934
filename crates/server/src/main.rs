//! Elytra server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use elytra_api::{middleware::AppState, router as api_router};
use elytra_common::Config;
use elytra_core::{
    AreaService, CityService, IssueService, NotificationService, UpvoteService, UserService,
    ZoneService,
};
use elytra_db::repositories::{
    AreaRepository, CityRepository, IssueRepository, NotificationRepository, UpvoteRepository,
    UserRepository, ZoneRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "elytra=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting elytra server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = Arc::new(elytra_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    elytra_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let user_repo = UserRepository::new(db.clone());
    let issue_repo = IssueRepository::new(db.clone());
    let upvote_repo = UpvoteRepository::new(db.clone());
    let notification_repo = NotificationRepository::new(db.clone());
    let city_repo = CityRepository::new(db.clone());
    let zone_repo = ZoneRepository::new(db.clone());
    let area_repo = AreaRepository::new(db.clone());

    // Initialize services
    let notification_service = NotificationService::new(
        notification_repo,
        user_repo.clone(),
        issue_repo.clone(),
    );
    let user_service = UserService::new(user_repo.clone());
    let issue_service = IssueService::new(
        issue_repo.clone(),
        user_repo.clone(),
        city_repo.clone(),
        zone_repo.clone(),
        area_repo.clone(),
        notification_service.clone(),
    );
    let upvote_service = UpvoteService::new(upvote_repo, issue_repo, user_repo);
    let city_service = CityService::new(city_repo.clone(), notification_service.clone());
    let zone_service = ZoneService::new(zone_repo.clone(), city_repo, notification_service.clone());
    let area_service = AreaService::new(area_repo, zone_repo, notification_service.clone());

    let state = AppState {
        user_service,
        issue_service,
        upvote_service,
        notification_service,
        city_service,
        zone_service,
        area_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server with graceful shutdown
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
