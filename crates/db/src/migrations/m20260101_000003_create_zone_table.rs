//! Create zone table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Zone::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Zone::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Zone::CityId).string_len(32).not_null())
                    .col(ColumnDef::new(Zone::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Zone::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_zone_city")
                            .from(Zone::Table, Zone::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (city_id, name) - zone names unique among siblings
        manager
            .create_index(
                Index::create()
                    .name("idx_zone_city_name")
                    .table(Zone::Table)
                    .col(Zone::CityId)
                    .col(Zone::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Zone::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Zone {
    Table,
    Id,
    CityId,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum City {
    Table,
    Id,
}
