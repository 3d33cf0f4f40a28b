//! Test helpers shared by unit tests.

use std::collections::HashMap;

use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::migrations::Migrator;
use crate::state::AppState;

/// Create an in-memory SQLite database with every migration applied
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Build a configuration from the given variables only, ignoring the process environment
pub fn test_config(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

pub fn test_state(db: Option<DatabaseConnection>, vars: &[(&str, &str)]) -> AppState {
    AppState::new(db, test_config(vars)).expect("Failed to build test state")
}
