use std::sync::Arc;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::services::rate_limit::RateLimiter;
use crate::services::strava::StravaClient;

/// Shared database connection (absent when the server runs without a database)
pub type SharedDbConn = Arc<RwLock<Option<DbConn>>>;

/// Application state containing all shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: SharedDbConn,
    pub config: Arc<Config>,
    pub rate_limiter: RateLimiter,
    pub strava: StravaClient,
}

impl AppState {
    pub fn new(db: Option<DbConn>, config: Config) -> Result<Self> {
        let rate_limiter = RateLimiter::from_config(&config.server);
        let strava = StravaClient::new(config.strava.clone())?;

        Ok(Self {
            db: Arc::new(RwLock::new(db)),
            config: Arc::new(config),
            rate_limiter,
            strava,
        })
    }

    /// Set the database connection once it becomes available
    pub async fn set_db(&self, db: DbConn) {
        let mut db_guard = self.db.write().await;
        *db_guard = Some(db);
    }

    /// Get the database connection (returns error if not connected)
    pub async fn get_db(&self) -> Result<DbConn> {
        let db_guard = self.db.read().await;
        db_guard
            .clone()
            .ok_or_else(|| AppError::ServiceUnavailable("Database not connected".to_string()))
    }

    /// Check if database is connected
    pub async fn is_db_connected(&self) -> bool {
        let db_guard = self.db.read().await;
        db_guard.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{create_test_db, test_config};

    #[tokio::test]
    async fn test_state_without_database() {
        let state = AppState::new(None, test_config(&[])).unwrap();
        assert!(!state.is_db_connected().await);
        assert!(matches!(
            state.get_db().await,
            Err(AppError::ServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_set_db_connects() {
        let state = AppState::new(None, test_config(&[])).unwrap();
        state.set_db(create_test_db().await).await;
        assert!(state.is_db_connected().await);
        assert!(state.get_db().await.is_ok());
    }
}
