//! Area service.
//!
//! Area announcements use the plain system type rather than the
//! system_announcement type used by cities and zones.

use elytra_common::{AppError, AppResult, IdGenerator};
use elytra_db::{
    entities::{area, notification::NotificationType},
    repositories::{AreaRepository, ZoneRepository},
};
use sea_orm::{IntoActiveModel, Set};

use crate::services::notification::NotificationService;

/// Area service for business logic.
#[derive(Clone)]
pub struct AreaService {
    area_repo: AreaRepository,
    zone_repo: ZoneRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl AreaService {
    /// Create a new area service.
    #[must_use]
    pub const fn new(
        area_repo: AreaRepository,
        zone_repo: ZoneRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            area_repo,
            zone_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get an area by ID.
    pub async fn get(&self, id: &str) -> AppResult<area::Model> {
        self.area_repo.get_by_id(id).await
    }

    /// Get all areas in a zone.
    pub async fn list_by_zone(&self, zone_id: &str) -> AppResult<Vec<area::Model>> {
        self.zone_repo.get_by_id(zone_id).await?;
        self.area_repo.find_by_zone(zone_id).await
    }

    /// Create an area under a zone and announce it to all users.
    pub async fn create(&self, zone_id: &str, name: &str) -> AppResult<area::Model> {
        let zone = self.zone_repo.get_by_id(zone_id).await?;

        if self.area_repo.exists_by_zone_and_name(zone_id, name).await? {
            return Err(AppError::Conflict(
                "Area already exists in this zone".to_string(),
            ));
        }

        let model = area::ActiveModel {
            id: Set(self.id_gen.generate()),
            zone_id: Set(zone_id.to_string()),
            name: Set(name.to_string()),
            ..Default::default()
        };

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("New area added in {}: {name}", zone.name),
                NotificationType::System,
            )
            .await?;

        let created = self
            .area_repo
            .create_with_broadcast(model, broadcast)
            .await?;

        tracing::info!(area_id = %created.id, zone_id = %zone_id, name = %created.name, "Area created");
        Ok(created)
    }

    /// Rename an area and announce the change to all users.
    pub async fn rename(&self, id: &str, name: &str) -> AppResult<area::Model> {
        let existing = self.area_repo.get_by_id(id).await?;
        let old_name = existing.name.clone();

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("Area updated: {old_name} → {name}"),
                NotificationType::System,
            )
            .await?;

        self.area_repo.update_with_broadcast(model, broadcast).await
    }

    /// Delete an area and announce the removal to all users.
    ///
    /// Area references on issues are cleared in the same transaction so no
    /// issue is left pointing at a removed area.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let existing = self.area_repo.get_by_id(id).await?;

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("Area removed: {}", existing.name),
                NotificationType::System,
            )
            .await?;

        self.area_repo.delete_with_broadcast(id, broadcast).await?;

        tracing::info!(area_id = %id, name = %existing.name, "Area deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use elytra_db::entities::zone;
    use elytra_db::repositories::{IssueRepository, NotificationRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_zone(id: &str, city_id: &str, name: &str) -> zone::Model {
        zone::Model {
            id: id.to_string(),
            city_id: city_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> AreaService {
        AreaService::new(
            AreaRepository::new(db.clone()),
            ZoneRepository::new(db.clone()),
            NotificationService::new(
                NotificationRepository::new(db.clone()),
                UserRepository::new(db.clone()),
                IssueRepository::new(db),
            ),
        )
    }

    #[tokio::test]
    async fn test_create_unknown_zone_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<zone::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create("missing", "Market Street").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_sibling_duplicate_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_zone("z1", "c1", "North")]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create("z1", "Market Street").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
