//! Migration: Create visits table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Visits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Visits::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Visits::SessionId).string().null())
                    .col(ColumnDef::new(Visits::AthleteId).big_integer().null())
                    .col(ColumnDef::new(Visits::ClubId).string_len(64).null())
                    .col(
                        ColumnDef::new(Visits::PagePath)
                            .string()
                            .not_null()
                            .default("/"),
                    )
                    .col(ColumnDef::new(Visits::IpAddress).string().null())
                    .col(ColumnDef::new(Visits::UserAgent).text().null())
                    .col(
                        ColumnDef::new(Visits::CreatedAt)
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
                    .name("idx_visits_created_at")
                    .table(Visits::Table)
                    .col(Visits::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Visits::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Visits {
    Table,
    Id,
    #[iden = "session_id"]
    SessionId,
    #[iden = "athlete_id"]
    AthleteId,
    #[iden = "club_id"]
    ClubId,
    #[iden = "page_path"]
    PagePath,
    #[iden = "ip_address"]
    IpAddress,
    #[iden = "user_agent"]
    UserAgent,
    #[iden = "created_at"]
    CreatedAt,
}
