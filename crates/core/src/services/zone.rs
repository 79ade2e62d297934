//! Zone service.

use elytra_common::{AppError, AppResult, IdGenerator};
use elytra_db::{
    entities::{notification::NotificationType, zone},
    repositories::{CityRepository, ZoneRepository},
};
use sea_orm::{IntoActiveModel, Set};

use crate::services::notification::NotificationService;

/// Zone service for business logic.
#[derive(Clone)]
pub struct ZoneService {
    zone_repo: ZoneRepository,
    city_repo: CityRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl ZoneService {
    /// Create a new zone service.
    #[must_use]
    pub const fn new(
        zone_repo: ZoneRepository,
        city_repo: CityRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            zone_repo,
            city_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a zone by ID.
    pub async fn get(&self, id: &str) -> AppResult<zone::Model> {
        self.zone_repo.get_by_id(id).await
    }

    /// Get all zones in a city.
    pub async fn list_by_city(&self, city_id: &str) -> AppResult<Vec<zone::Model>> {
        self.city_repo.get_by_id(city_id).await?;
        self.zone_repo.find_by_city(city_id).await
    }

    /// Create a zone under a city and announce it to all users.
    pub async fn create(&self, city_id: &str, name: &str) -> AppResult<zone::Model> {
        let city = self.city_repo.get_by_id(city_id).await?;

        if self.zone_repo.exists_by_city_and_name(city_id, name).await? {
            return Err(AppError::Conflict(
                "Zone already exists in this city".to_string(),
            ));
        }

        let model = zone::ActiveModel {
            id: Set(self.id_gen.generate()),
            city_id: Set(city_id.to_string()),
            name: Set(name.to_string()),
            ..Default::default()
        };

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("New zone added in {}: {name}", city.name),
                NotificationType::SystemAnnouncement,
            )
            .await?;

        let created = self
            .zone_repo
            .create_with_broadcast(model, broadcast)
            .await?;

        tracing::info!(zone_id = %created.id, city_id = %city_id, name = %created.name, "Zone created");
        Ok(created)
    }

    /// Rename a zone and announce the change to all users.
    pub async fn rename(&self, id: &str, name: &str) -> AppResult<zone::Model> {
        let existing = self.zone_repo.get_by_id(id).await?;
        let old_name = existing.name.clone();

        let mut model = existing.into_active_model();
        model.name = Set(name.to_string());

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("Zone updated: {old_name} → {name}"),
                NotificationType::SystemAnnouncement,
            )
            .await?;

        self.zone_repo.update_with_broadcast(model, broadcast).await
    }

    /// Delete a zone and announce the removal to all users.
    ///
    /// Issues tagged with the zone keep existing; their zone and area
    /// references are cleared in the same transaction.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let existing = self.zone_repo.get_by_id(id).await?;

        let broadcast = self
            .notifications
            .broadcast_models(
                &format!("Zone removed: {}", existing.name),
                NotificationType::SystemAnnouncement,
            )
            .await?;

        self.zone_repo.delete_with_broadcast(id, broadcast).await?;

        tracing::info!(zone_id = %id, name = %existing.name, "Zone deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use elytra_db::entities::city;
    use elytra_db::repositories::{IssueRepository, NotificationRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_city(id: &str, name: &str) -> city::Model {
        city::Model {
            id: id.to_string(),
            name: name.to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service_with(db: Arc<sea_orm::DatabaseConnection>) -> ZoneService {
        ZoneService::new(
            ZoneRepository::new(db.clone()),
            CityRepository::new(db.clone()),
            NotificationService::new(
                NotificationRepository::new(db.clone()),
                UserRepository::new(db.clone()),
                IssueRepository::new(db),
            ),
        )
    }

    #[tokio::test]
    async fn test_create_unknown_city_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<city::Model>::new()])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create("missing", "North").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_create_sibling_duplicate_fails() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![create_test_city("c1", "Springfield")]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );

        let service = service_with(db);
        let result = service.create("c1", "North").await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
