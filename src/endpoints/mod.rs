pub mod admin;
pub mod analytics;
pub mod static_files;
pub mod strava;
pub mod templates;

use axum::{middleware as axum_middleware, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::services::ServeDir;

use crate::middleware::{add_security_headers, answer_options, rate_limit};
use crate::state::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/healthcheck", get(health_check))
        .nest("/api", api_routes())
        .nest("/route/api", api_routes())
        .merge(static_files::static_routes())
        .fallback_service(static_dir)
        .with_state(state.clone())
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            static_files::hide_data_dir,
        ))
        .layer(axum_middleware::from_fn(answer_options))
        .layer(axum_middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(axum_middleware::from_fn_with_state(
            state,
            add_security_headers,
        ))
}

/// API routes, mounted under both `/api` and `/route/api`
fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(strava::strava_routes())
        .merge(analytics::analytics_routes())
        .merge(templates::templates_routes())
        .merge(admin::admin_routes())
}

/// Health check endpoint
async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}
