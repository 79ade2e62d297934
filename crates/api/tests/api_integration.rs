//! Router tests over a mocked database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use elytra_api::{AppState, router};
use elytra_core::{
    AreaService, CityService, IssueService, NotificationService, UpvoteService, UserService,
    ZoneService,
};
use elytra_db::entities::issue;
use elytra_db::repositories::{
    AreaRepository, CityRepository, IssueRepository, NotificationRepository, UpvoteRepository,
    UserRepository, ZoneRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use tower::ServiceExt;

fn app_with(db: Arc<DatabaseConnection>) -> Router {
    let user_repo = UserRepository::new(db.clone());
    let issue_repo = IssueRepository::new(db.clone());
    let notification_service = NotificationService::new(
        NotificationRepository::new(db.clone()),
        user_repo.clone(),
        issue_repo.clone(),
    );
    let city_repo = CityRepository::new(db.clone());
    let zone_repo = ZoneRepository::new(db.clone());
    let area_repo = AreaRepository::new(db.clone());

    let state = AppState {
        user_service: UserService::new(user_repo.clone()),
        issue_service: IssueService::new(
            issue_repo.clone(),
            user_repo.clone(),
            city_repo.clone(),
            zone_repo.clone(),
            area_repo.clone(),
            notification_service.clone(),
        ),
        upvote_service: UpvoteService::new(
            UpvoteRepository::new(db.clone()),
            issue_repo,
            user_repo,
        ),
        notification_service,
        city_service: CityService::new(city_repo.clone(), NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            IssueRepository::new(db.clone()),
        )),
        zone_service: ZoneService::new(zone_repo.clone(), city_repo, NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            IssueRepository::new(db.clone()),
        )),
        area_service: AreaService::new(area_repo, zone_repo, NotificationService::new(
            NotificationRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            IssueRepository::new(db),
        )),
    };

    router().with_state(state)
}

#[tokio::test]
async fn test_health_endpoint() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = app_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_missing_issue_maps_to_404() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<issue::Model>::new()])
            .into_connection(),
    );
    let app = app_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/issues/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "ISSUE_NOT_FOUND");
}

#[tokio::test]
async fn test_register_rejects_invalid_email() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = app_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"username": "alice", "email": "not-an-email"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_sort_order_rejected() {
    let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
    let app = app_with(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/issues?sort=oldest")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
