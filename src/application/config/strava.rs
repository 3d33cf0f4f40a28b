#[derive(Debug, Clone)]
pub struct StravaConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: String,
    pub authorize_url: String,
    pub api_base_url: String,
    pub scope: String,
}

impl StravaConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            client_id: non_empty("STRAVA_CLIENT_ID"),
            client_secret: non_empty("STRAVA_CLIENT_SECRET"),
            token_url: non_empty("STRAVA_TOKEN_URL")
                .unwrap_or_else(|| "https://www.strava.com/oauth/token".to_string()),
            authorize_url: "https://www.strava.com/oauth/authorize".to_string(),
            api_base_url: "https://www.strava.com/api/v3".to_string(),
            scope: "read,activity:read_all".to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }

    /// Client id shortened for log output.
    pub fn display_client_id(&self) -> String {
        match &self.client_id {
            Some(id) if id.chars().count() > 10 => {
                format!("{}...", id.chars().take(10).collect::<String>())
            }
            Some(id) => id.clone(),
            None => "NOT SET".to_string(),
        }
    }
}
