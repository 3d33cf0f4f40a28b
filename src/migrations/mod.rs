pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_clubs;
mod m20260301_000002_create_templates;
mod m20260301_000003_create_athletes;
mod m20260301_000004_create_auth_events;
mod m20260301_000005_create_downloads;
mod m20260301_000006_create_visits;
mod m20260301_000007_create_analytics_views;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_clubs::Migration),
            Box::new(m20260301_000002_create_templates::Migration),
            Box::new(m20260301_000003_create_athletes::Migration),
            Box::new(m20260301_000004_create_auth_events::Migration),
            Box::new(m20260301_000005_create_downloads::Migration),
            Box::new(m20260301_000006_create_visits::Migration),
            Box::new(m20260301_000007_create_analytics_views::Migration),
        ]
    }
}
