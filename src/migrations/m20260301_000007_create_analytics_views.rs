//! Migration: Create daily_stats and monthly_stats views
//!
//! Both views expose a text period key plus download, visit and auth counts.
//! The date formatting function differs between Postgres and SQLite.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseBackend};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = manager.get_database_backend();

        for (view, key, granularity) in [
            ("daily_stats", "day", Granularity::Day),
            ("monthly_stats", "month", Granularity::Month),
        ] {
            db.execute_unprepared(&view_sql(backend, view, key, granularity))
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP VIEW IF EXISTS monthly_stats").await?;
        db.execute_unprepared("DROP VIEW IF EXISTS daily_stats").await?;
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Granularity {
    Day,
    Month,
}

fn period_expr(backend: DatabaseBackend, column: &str, granularity: Granularity) -> String {
    match (backend, granularity) {
        (DatabaseBackend::Sqlite, Granularity::Day) => format!("strftime('%Y-%m-%d', {column})"),
        (DatabaseBackend::Sqlite, Granularity::Month) => format!("strftime('%Y-%m', {column})"),
        (_, Granularity::Day) => format!("TO_CHAR({column}, 'YYYY-MM-DD')"),
        (_, Granularity::Month) => format!("TO_CHAR({column}, 'YYYY-MM')"),
    }
}

fn view_sql(backend: DatabaseBackend, view: &str, key: &str, granularity: Granularity) -> String {
    let create = match backend {
        DatabaseBackend::Sqlite => format!("CREATE VIEW IF NOT EXISTS {view}"),
        _ => format!("CREATE OR REPLACE VIEW {view}"),
    };
    let downloads = period_expr(backend, "created_at", granularity);
    let visits = period_expr(backend, "created_at", granularity);
    let auths = period_expr(backend, "event_date", granularity);

    format!(
        "{create} AS \
         SELECT {key}, \
                CAST(SUM(downloads) AS BIGINT) AS downloads, \
                CAST(SUM(visits) AS BIGINT) AS visits, \
                CAST(SUM(auth_events) AS BIGINT) AS auth_events \
         FROM ( \
             SELECT {downloads} AS {key}, COUNT(*) AS downloads, 0 AS visits, 0 AS auth_events \
             FROM downloads GROUP BY 1 \
             UNION ALL \
             SELECT {visits} AS {key}, 0 AS downloads, COUNT(*) AS visits, 0 AS auth_events \
             FROM visits GROUP BY 1 \
             UNION ALL \
             SELECT {auths} AS {key}, 0 AS downloads, 0 AS visits, COUNT(*) AS auth_events \
             FROM auth_events GROUP BY 1 \
         ) counts \
         GROUP BY {key}"
    )
}
