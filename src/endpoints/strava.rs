use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use sea_orm::TransactionTrait;

use crate::error::{AppError, Result};
use crate::services::athlete_store;
use crate::services::strava::{ExchangeOutcome, StravaAthlete};
use crate::state::AppState;

pub fn strava_routes() -> Router<AppState> {
    Router::new()
        .route("/strava/token", post(exchange_token))
        .route("/strava/auth", get(authorize))
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub code: Option<String>,
}

/// Relay an OAuth authorization code to Strava and hand the tokens back.
async fn exchange_token(
    State(state): State<AppState>,
    Json(request): Json<TokenRequest>,
) -> Result<Response> {
    let code = request
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    let token = match state.strava.exchange_code(&code).await? {
        ExchangeOutcome::Granted(token) => token,
        ExchangeOutcome::Rejected { status, .. } => {
            tracing::warn!(status, "Strava API rejected authorization code");
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Token exchange failed"})),
            )
                .into_response());
        }
    };

    if let Some(profile) = token.athlete_profile() {
        let token_hash = athlete_store::hash_token(token.access_token.as_deref().unwrap_or_default());
        save_athlete(&state, &profile, &token_hash).await;
        tracing::info!(
            athlete_id = profile.id,
            "Token exchange successful for athlete: {}",
            profile.firstname.as_deref().unwrap_or("Unknown")
        );
    }

    Ok(Json(json!({
        "access_token": token.access_token,
        "refresh_token": token.refresh_token,
        "expires_at": token.expires_at,
        "athlete": token.athlete.unwrap_or_else(|| json!({})),
    }))
    .into_response())
}

/// Persist the athlete to the database, falling back to the flat-file store.
async fn save_athlete(state: &AppState, profile: &StravaAthlete, token_hash: &str) {
    if let Ok(db) = state.get_db().await {
        match save_to_db(&db, profile, token_hash).await {
            Ok(()) => {
                tracing::debug!(athlete_id = profile.id, "Athlete saved to database");
                return;
            }
            Err(e) => tracing::warn!("Error saving athlete to database: {}", e),
        }
    }

    match athlete_store::save_to_file(&state.config.server.data_dir, profile, token_hash).await {
        Ok(path) => tracing::info!(path = %path.display(), "Athlete saved to fallback file"),
        Err(e) => tracing::warn!("Error saving athlete to fallback file: {}", e),
    }
}

async fn save_to_db(
    db: &crate::db::DbConn,
    profile: &StravaAthlete,
    token_hash: &str,
) -> Result<()> {
    let txn = db.begin().await?;
    athlete_store::upsert_athlete(&txn, profile, token_hash).await?;
    athlete_store::record_auth_event(&txn, profile.id, Utc::now().date_naive()).await?;
    txn.commit().await?;
    Ok(())
}

/// Send the browser to Strava's consent page.
async fn authorize(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(|host| format!("http://{}", host))
        })
        .unwrap_or_else(|| format!("http://localhost:{}", state.config.server.port));

    let redirect_uri = format!("{}/route/oauth/", origin.trim_end_matches('/'));
    Ok(Redirect::to(&state.strava.authorize_url(&redirect_uri)?))
}
