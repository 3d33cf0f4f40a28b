//! Strava OAuth token exchange.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::strava::StravaConfig;
use crate::error::{AppError, Result};

const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

/// Athlete profile as returned inside the token response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StravaAthlete {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<i64>,
    /// Raw athlete object, relayed to the browser unchanged.
    #[serde(default)]
    pub athlete: Option<serde_json::Value>,
}

impl TokenResponse {
    /// Typed view of the athlete object, when it carries an id.
    pub fn athlete_profile(&self) -> Option<StravaAthlete> {
        self.athlete
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

#[derive(Debug)]
pub enum ExchangeOutcome {
    Granted(TokenResponse),
    /// Strava answered with a non-success status.
    Rejected { status: u16, body: String },
}

#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    config: StravaConfig,
}

impl StravaClient {
    pub fn new(config: StravaConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(TOKEN_TIMEOUT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Authorization URL the browser is redirected to.
    pub fn authorize_url(&self, redirect_uri: &str) -> Result<String> {
        let client_id = self.config.client_id.as_deref().ok_or_else(|| {
            AppError::ServiceUnavailable("Strava client id is not configured".to_string())
        })?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&approval_prompt=auto&scope={}",
            self.config.authorize_url,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&self.config.scope),
        ))
    }

    /// Trade an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<ExchangeOutcome> {
        if !self.config.is_configured() {
            return Err(AppError::ServiceUnavailable(
                "Strava credentials are not configured".to_string(),
            ));
        }

        let form = [
            ("client_id", self.config.client_id.as_deref().unwrap_or_default()),
            ("client_secret", self.config.client_secret.as_deref().unwrap_or_default()),
            ("code", code),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Strava token exchange rejected: {}", body);
            return Ok(ExchangeOutcome::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let token = response.json::<TokenResponse>().await?;
        Ok(ExchangeOutcome::Granted(token))
    }
}
