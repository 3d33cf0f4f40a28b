use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::error::Result;
use crate::services::athlete_store;
use crate::state::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin/users", get(list_users))
}

/// Connected athletes from the database, or from the flat-file store when
/// the database is unavailable.
async fn list_users(State(state): State<AppState>) -> Result<Json<Value>> {
    if let Ok(db) = state.get_db().await {
        match athlete_store::list_active(&db).await {
            Ok(users) => return Ok(Json(json!({ "users": users }))),
            Err(e) => tracing::warn!("Error querying athletes: {}", e),
        }
    }

    let users = athlete_store::list_from_files(&state.config.server.data_dir).await?;
    Ok(Json(json!({ "users": users })))
}
