//! Create area table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Area::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Area::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Area::ZoneId).string_len(32).not_null())
                    .col(ColumnDef::new(Area::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Area::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_area_zone")
                            .from(Area::Table, Area::ZoneId)
                            .to(Zone::Table, Zone::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (zone_id, name) - area names unique among siblings
        manager
            .create_index(
                Index::create()
                    .name("idx_area_zone_name")
                    .table(Area::Table)
                    .col(Area::ZoneId)
                    .col(Area::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Area::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Area {
    Table,
    Id,
    ZoneId,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Zone {
    Table,
    Id,
}
