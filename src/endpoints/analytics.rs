use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::Result;
use crate::services::analytics::{
    self, AnalyticsEvent, AuthEvent, ClientInfo, DownloadEvent, StatsReport, VisitEvent,
};
use crate::state::AppState;

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/analytics", post(record_event))
        .route("/analytics/download", post(record_download))
        .route("/analytics/visit", post(record_visit))
        .route("/analytics/auth", post(record_auth))
        .route("/analytics/stats", get(get_stats))
}

fn client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    ClientInfo {
        ip_address,
        user_agent,
    }
}

fn ok() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Generic event endpoint dispatching on the `type` field.
async fn record_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Response> {
    let event = match serde_json::from_value::<AnalyticsEvent>(body) {
        Ok(event) => event,
        Err(_) => {
            return Ok((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid event type"})),
            )
                .into_response())
        }
    };

    let db = state.get_db().await?;
    let client = client_info(&headers);
    match event {
        AnalyticsEvent::Download(event) => {
            analytics::record_download(&db, event, client).await?;
        }
        AnalyticsEvent::Visit(event) => {
            analytics::record_visit(&db, event, client).await?;
        }
    }
    Ok(ok().into_response())
}

async fn record_download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<DownloadEvent>,
) -> Result<Json<Value>> {
    let db = state.get_db().await?;
    analytics::record_download(&db, event, client_info(&headers)).await?;
    Ok(ok())
}

async fn record_visit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<VisitEvent>,
) -> Result<Json<Value>> {
    let db = state.get_db().await?;
    analytics::record_visit(&db, event, client_info(&headers)).await?;
    Ok(ok())
}

async fn record_auth(
    State(state): State<AppState>,
    Json(event): Json<AuthEvent>,
) -> Result<Json<Value>> {
    let db = state.get_db().await?;
    analytics::record_auth(&db, event).await?;
    Ok(ok())
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsReport>> {
    let db = state.get_db().await?;
    Ok(Json(analytics::stats(&db).await?))
}
