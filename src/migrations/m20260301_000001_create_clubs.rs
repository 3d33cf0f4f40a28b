//! Migration: Create clubs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Clubs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Clubs::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Clubs::Name).string().not_null())
                    .col(ColumnDef::new(Clubs::Slug).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Clubs::Description).text().null())
                    .col(ColumnDef::new(Clubs::Theme).json_binary().not_null())
                    .col(
                        ColumnDef::new(Clubs::Status)
                            .string_len(32)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Clubs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Clubs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clubs::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Clubs {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Theme,
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}
