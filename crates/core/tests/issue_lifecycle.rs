//! Issue lifecycle integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test issue_lifecycle -- --ignored`
//!
//! Environment variables are the same as for the `elytra-db` integration
//! tests (`TEST_DB_HOST`, `TEST_DB_PORT`, ...).

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use elytra_core::{CreateIssueInput, IssueService, NotificationService};
use elytra_db::entities::{issue::IssueStatus, issue::Priority, user};
use elytra_db::repositories::{
    AreaRepository, CityRepository, IssueRepository, NotificationRepository, UserRepository,
    ZoneRepository,
};
use elytra_db::test_utils::TestDatabase;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};

async fn seed_user(conn: &DatabaseConnection, id: &str) -> user::Model {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(format!("user_{id}")),
        email: Set(format!("{id}@example.com")),
        role: Set(user::Role::User),
        status: Set(user::Status::Active),
        provider: Set(user::AuthProvider::Local),
        email_verified: Set(true),
        ..Default::default()
    }
    .insert(conn)
    .await
    .unwrap()
}

fn issue_service(conn: Arc<DatabaseConnection>) -> IssueService {
    IssueService::new(
        IssueRepository::new(conn.clone()),
        UserRepository::new(conn.clone()),
        CityRepository::new(conn.clone()),
        ZoneRepository::new(conn.clone()),
        AreaRepository::new(conn.clone()),
        NotificationService::new(
            NotificationRepository::new(conn.clone()),
            UserRepository::new(conn.clone()),
            IssueRepository::new(conn),
        ),
    )
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_resolved_at_stamped_once_across_reresolution() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.connection().clone());

    let reporter = seed_user(db.connection(), "u1").await;
    let service = issue_service(conn);

    let created = service
        .create(CreateIssueInput {
            user_id: reporter.id.clone(),
            title: "Fallen tree across the bike path".to_string(),
            description: "Blocking both lanes since last night's storm".to_string(),
            category: "parks".to_string(),
            priority: Priority::High,
            city_id: None,
            zone_id: None,
            area_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created.status, IssueStatus::Pending);
    assert!(created.resolved_at.is_none());

    let resolved = service
        .set_status(&created.id, IssueStatus::Resolved)
        .await
        .unwrap();
    let first_resolution = resolved.resolved_at.unwrap();

    // Reopening keeps the original resolution stamp
    let reopened = service
        .set_status(&created.id, IssueStatus::Pending)
        .await
        .unwrap();
    assert_eq!(reopened.status, IssueStatus::Pending);
    assert_eq!(reopened.resolved_at, Some(first_resolution));

    // Resolving again does not overwrite it
    let re_resolved = service
        .set_status(&created.id, IssueStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(re_resolved.resolved_at, Some(first_resolution));

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_status_changes_notify_owner_once_each() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.connection().clone());

    let reporter = seed_user(db.connection(), "u1").await;
    let service = issue_service(conn.clone());
    let notifications = NotificationRepository::new(conn);

    let created = service
        .create(CreateIssueInput {
            user_id: reporter.id.clone(),
            title: "Graffiti on the underpass".to_string(),
            description: "Covers the whole east wall".to_string(),
            category: "vandalism".to_string(),
            priority: Priority::Low,
            city_id: None,
            zone_id: None,
            area_id: None,
        })
        .await
        .unwrap();

    service
        .set_status(&created.id, IssueStatus::InProgress)
        .await
        .unwrap();
    // Same-status transition writes nothing
    service
        .set_status(&created.id, IssueStatus::InProgress)
        .await
        .unwrap();
    service
        .set_status(&created.id, IssueStatus::Resolved)
        .await
        .unwrap();

    let rows = notifications.find_by_user(&reporter.id, false).await.unwrap();
    assert_eq!(rows.len(), 2);

    db.drop_database().await.unwrap();
}
