use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `landing.html`, `index.html`, `support.html` and assets.
    pub static_dir: PathBuf,
    /// Directory for the flat-file athlete fallback store.
    pub data_dir: PathBuf,
    /// Allowed CORS origins, parsed from `ALLOWED_ORIGINS` (comma-separated).
    /// Outside production any origin is mirrored back.
    pub allowed_origins: Vec<String>,
    pub rate_limit_window_secs: u64,
    pub rate_limit_max_requests: usize,
    /// Upper bound on the number of client addresses tracked by the rate limiter.
    pub rate_limit_max_clients: usize,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed_origins: Vec<String> = lookup("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            static_dir: PathBuf::from(lookup("STATIC_DIR").unwrap_or_else(|| ".".to_string())),
            data_dir: PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "data".to_string())),
            allowed_origins: if allowed_origins.is_empty() {
                vec!["http://localhost:8000".to_string()]
            } else {
                allowed_origins
            },
            rate_limit_window_secs: 60,
            rate_limit_max_requests: 100,
            rate_limit_max_clients: 10_000,
        }
    }
}
