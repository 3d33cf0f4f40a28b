pub mod database;
pub mod server;
pub mod strava;

use once_cell::sync::Lazy;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub server: server::ServerConfig,
    pub database: database::DatabaseConfig,
    pub strava: strava::StravaConfig,

    // Deployment
    pub environment: Option<String>,
    pub railway_environment: Option<String>,

    // Build info
    pub version: String,

    // Logging
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: server::ServerConfig::from_lookup(&lookup),
            database: database::DatabaseConfig::from_lookup(&lookup),
            strava: strava::StravaConfig::from_lookup(&lookup),

            environment: lookup("ENVIRONMENT"),
            railway_environment: lookup("RAILWAY_ENVIRONMENT"),

            version: env!("CARGO_PKG_VERSION").to_string(),

            log_level: lookup("ADDICTED_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Production when `ENVIRONMENT=production` or when running on Railway.
    pub fn is_production(&self) -> bool {
        self.environment.as_deref() == Some("production") || self.railway_environment.is_some()
    }

    /// Human readable deployment label used in startup logs.
    pub fn environment_label(&self) -> &'static str {
        if self.railway_environment.is_some() {
            "RAILWAY"
        } else if self.environment.as_deref() == Some("production") {
            "PRODUCTION"
        } else {
            "DEVELOPMENT"
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
