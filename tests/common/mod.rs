//! Test helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tower::util::ServiceExt;

use addicted::config::Config;
use addicted::endpoints::create_router;
use addicted::migrations::Migrator;
use addicted::state::AppState;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run test migrations");

    db
}

/// Configuration built only from `vars`, never from the process environment
pub fn test_config(vars: &[(&str, &str)]) -> Config {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| vars.get(key).cloned())
}

pub fn build_app_state(db: Option<DatabaseConnection>, vars: &[(&str, &str)]) -> AppState {
    AppState::new(db, test_config(vars)).expect("Failed to build app state")
}

pub fn build_app(state: AppState) -> Router {
    create_router(state)
}

/// GET request carrying a peer address, as the server's connect-info would provide
pub fn get_from(uri: &str, peer: SocketAddr) -> Request<Body> {
    let mut request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    request
}

pub fn get(uri: &str) -> Request<Body> {
    get_from(uri, "127.0.0.1:40000".parse().unwrap())
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    request
        .extensions_mut()
        .insert(ConnectInfo("127.0.0.1:40000".parse::<SocketAddr>().unwrap()));
    request
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
