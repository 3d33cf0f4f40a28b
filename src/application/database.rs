use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::config::database::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::migrations::Migrator;

pub type DbConn = DatabaseConnection;

/// Create a new database connection with a specific URL and run migrations
pub async fn connect_with_url(database_url: &str) -> Result<DbConn> {
    tracing::info!("Connecting to database...");

    let mut opts = ConnectOptions::new(database_url);
    opts.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    let db = Database::connect(opts)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to connect to database: {}", e)))?;

    tracing::info!("Running database migrations...");
    Migrator::up(&db, None)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to run migrations: {}", e)))?;
    tracing::info!("Database migrations completed");

    Ok(db)
}

/// Connect using the configured URL, retrying with exponential backoff.
///
/// Attempt `n` (starting at 0) waits `connect_delay * 2^n` before the next try.
pub async fn connect_with_retry(config: &DatabaseConfig) -> Result<DbConn> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::ServiceUnavailable("DATABASE_URL is not set".to_string()))?;

    let attempts = config.connect_retries.max(1);
    let mut last_error = None;

    for attempt in 0..attempts {
        match connect_with_url(url).await {
            Ok(db) => return Ok(db),
            Err(e) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    attempts,
                    "Database connection failed: {}",
                    e
                );
                last_error = Some(e);
                if attempt + 1 < attempts {
                    tokio::time::sleep(backoff_delay(config.connect_delay, attempt)).await;
                }
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| AppError::ServiceUnavailable("Database unavailable".to_string())))
}

fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Try to connect once, returns None when no URL is configured or the database is down.
pub async fn try_connect(config: &DatabaseConfig) -> Option<DbConn> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::info!("No DATABASE_URL configured, running without database");
        return None;
    };

    match tokio::time::timeout(Duration::from_secs(10), connect_with_url(url)).await {
        Ok(Ok(db)) => Some(db),
        Ok(Err(e)) => {
            tracing::warn!("Database not available: {}", e);
            None
        }
        Err(_) => {
            tracing::warn!("Database connection timed out");
            None
        }
    }
}
