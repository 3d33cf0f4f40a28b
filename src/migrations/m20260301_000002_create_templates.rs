//! Migration: Create templates table
//!
//! `status` is limited to draft/published/deleted; deleted rows stay until purged.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Templates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Templates::Id)
                            .string_len(128)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Templates::ClubId).string_len(64).not_null())
                    .col(ColumnDef::new(Templates::Name).string().not_null())
                    .col(ColumnDef::new(Templates::Description).text().null())
                    .col(ColumnDef::new(Templates::Tags).json_binary().not_null())
                    .col(ColumnDef::new(Templates::Pages).json_binary().not_null())
                    .col(
                        ColumnDef::new(Templates::Version)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Templates::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft")
                            .check(
                                Expr::col(Templates::Status)
                                    .is_in(["draft", "published", "deleted"]),
                            ),
                    )
                    .col(
                        ColumnDef::new(Templates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Templates::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_templates_club_id")
                            .from(Templates::Table, Templates::ClubId)
                            .to(Clubs::Table, Clubs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_templates_club_id")
                    .table(Templates::Table)
                    .col(Templates::ClubId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_templates_status")
                    .table(Templates::Table)
                    .col(Templates::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Templates::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Templates {
    Table,
    Id,
    #[iden = "club_id"]
    ClubId,
    Name,
    Description,
    Tags,
    Pages,
    Version,
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

#[derive(Iden)]
pub enum Clubs {
    Table,
    Id,
}
