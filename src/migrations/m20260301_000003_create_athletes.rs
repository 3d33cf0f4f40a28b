//! Migration: Create athletes table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Athletes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Athletes::AthleteId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Athletes::Username).string().null())
                    .col(ColumnDef::new(Athletes::Firstname).string().null())
                    .col(ColumnDef::new(Athletes::Lastname).string().null())
                    .col(ColumnDef::new(Athletes::Email).string().null())
                    .col(ColumnDef::new(Athletes::City).string().null())
                    .col(ColumnDef::new(Athletes::Country).string().null())
                    .col(ColumnDef::new(Athletes::ProfilePicture).text().null())
                    .col(ColumnDef::new(Athletes::AccessTokenHash).string_len(64).null())
                    .col(
                        ColumnDef::new(Athletes::StravaCreatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Athletes::StravaUpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Athletes::ConnectedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Athletes::LastSeenAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Athletes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_athletes_connected_at")
                    .table(Athletes::Table)
                    .col(Athletes::ConnectedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Athletes::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Athletes {
    Table,
    #[iden = "athlete_id"]
    AthleteId,
    Username,
    Firstname,
    Lastname,
    Email,
    City,
    Country,
    #[iden = "profile_picture"]
    ProfilePicture,
    #[iden = "access_token_hash"]
    AccessTokenHash,
    #[iden = "strava_created_at"]
    StravaCreatedAt,
    #[iden = "strava_updated_at"]
    StravaUpdatedAt,
    #[iden = "connected_at"]
    ConnectedAt,
    #[iden = "last_seen_at"]
    LastSeenAt,
    #[iden = "is_active"]
    IsActive,
}
