//! Migration: Create downloads table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Downloads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Downloads::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Downloads::AthleteId).big_integer().null())
                    .col(ColumnDef::new(Downloads::ClubId).string_len(64).null())
                    .col(ColumnDef::new(Downloads::IpAddress).string().null())
                    .col(ColumnDef::new(Downloads::UserAgent).text().null())
                    .col(
                        ColumnDef::new(Downloads::FileFormat)
                            .string_len(16)
                            .not_null()
                            .default("png"),
                    )
                    .col(
                        ColumnDef::new(Downloads::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_downloads_created_at")
                    .table(Downloads::Table)
                    .col(Downloads::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Downloads::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Downloads {
    Table,
    Id,
    #[iden = "athlete_id"]
    AthleteId,
    #[iden = "club_id"]
    ClubId,
    #[iden = "ip_address"]
    IpAddress,
    #[iden = "user_agent"]
    UserAgent,
    #[iden = "file_format"]
    FileFormat,
    #[iden = "created_at"]
    CreatedAt,
}
