//! Create issue table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Issue::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Issue::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Issue::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Issue::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Issue::Description).text().not_null())
                    .col(ColumnDef::new(Issue::Category).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Issue::Priority)
                            .string_len(20)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(Issue::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Issue::Upvotes)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Issue::CityId).string_len(32).null())
                    .col(ColumnDef::new(Issue::ZoneId).string_len(32).null())
                    .col(ColumnDef::new(Issue::AreaId).string_len(32).null())
                    .col(
                        ColumnDef::new(Issue::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Issue::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Issue::ResolvedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_user")
                            .from(Issue::Table, Issue::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_city")
                            .from(Issue::Table, Issue::CityId)
                            .to(City::Table, City::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_zone")
                            .from(Issue::Table, Issue::ZoneId)
                            .to(Zone::Table, Zone::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_issue_area")
                            .from(Issue::Table, Issue::AreaId)
                            .to(Area::Table, Area::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's issues)
        manager
            .create_index(
                Index::create()
                    .name("idx_issue_user_id")
                    .table(Issue::Table)
                    .col(Issue::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: status (for status filters)
        manager
            .create_index(
                Index::create()
                    .name("idx_issue_status")
                    .table(Issue::Table)
                    .col(Issue::Status)
                    .to_owned(),
            )
            .await?;

        // Index: (upvotes, created_at) for popularity-ranked listings
        manager
            .create_index(
                Index::create()
                    .name("idx_issue_upvotes_created_at")
                    .table(Issue::Table)
                    .col(Issue::Upvotes)
                    .col(Issue::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Issue::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Issue {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Category,
    Priority,
    Status,
    Upvotes,
    CityId,
    ZoneId,
    AreaId,
    CreatedAt,
    UpdatedAt,
    ResolvedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum City {
    Table,
    Id,
}

#[derive(Iden)]
enum Zone {
    Table,
    Id,
}

#[derive(Iden)]
enum Area {
    Table,
    Id,
}
