//! Migration: Create auth_events table
//!
//! One row per athlete per day, enforced by a unique index.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuthEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthEvents::AthleteId).big_integer().not_null())
                    .col(ColumnDef::new(AuthEvents::EventDate).date().not_null())
                    .col(
                        ColumnDef::new(AuthEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auth_events_athlete_id")
                            .from(AuthEvents::Table, AuthEvents::AthleteId)
                            .to(Athletes::Table, Athletes::AthleteId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auth_events_athlete_day")
                    .table(AuthEvents::Table)
                    .col(AuthEvents::AthleteId)
                    .col(AuthEvents::EventDate)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuthEvents::Table).if_exists().to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum AuthEvents {
    Table,
    Id,
    #[iden = "athlete_id"]
    AthleteId,
    #[iden = "event_date"]
    EventDate,
    #[iden = "created_at"]
    CreatedAt,
}

#[derive(Iden)]
pub enum Athletes {
    Table,
    #[iden = "athlete_id"]
    AthleteId,
}
