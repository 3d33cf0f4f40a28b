use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// `DATABASE_PRIVATE_URL` when present, otherwise `DATABASE_URL`.
    pub database_url: Option<String>,
    pub connect_retries: u32,
    pub connect_delay: Duration,
}

impl DatabaseConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = ["DATABASE_PRIVATE_URL", "DATABASE_URL"]
            .iter()
            .filter_map(|key| lookup(*key))
            .map(|url| url.trim().to_string())
            .find(|url| !url.is_empty());

        Self {
            database_url,
            connect_retries: lookup("DATABASE_CONNECT_RETRIES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(5),
            connect_delay: lookup("DATABASE_CONNECT_DELAY")
                .and_then(|v| v.trim().parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .unwrap_or(Duration::from_secs(2)),
        }
    }
}
