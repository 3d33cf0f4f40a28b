//! Application bootstrapper
//!
//! Handles all initialization and setup for the addicted server.

use std::net::SocketAddr;

use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, CONFIG};
use crate::db;
use crate::endpoints;
use crate::middleware::cors_layer;
use crate::state::AppState;

/// Bootstrap and run the application
pub async fn run() -> anyhow::Result<()> {
    init_tracing(&CONFIG.log_level);

    let config = CONFIG.clone();
    log_startup(&config);

    let state = init_services(config).await?;
    let app = create_app(state.clone());

    serve(app, &state.config).await
}

/// Initialize tracing/logging
pub fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("addicted={},tower_http=info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();
}

fn log_startup(config: &Config) {
    tracing::info!(
        "Starting addicted v{} ({})",
        config.version,
        config.environment_label()
    );
    tracing::info!("Strava client id: {}", config.strava.display_client_id());
    tracing::info!(
        "Strava client secret: {}",
        if config.strava.client_secret.is_some() {
            "configured"
        } else {
            "NOT SET"
        }
    );
    tracing::info!("Serving static files from {}", config.server.static_dir.display());
}

/// Initialize all application services
async fn init_services(config: Config) -> anyhow::Result<AppState> {
    let conn = init_database(&config).await;
    Ok(AppState::new(conn, config)?)
}

/// Connect to the database when one is configured (runs migrations automatically).
/// Returns None when the server should run without persistence.
async fn init_database(config: &Config) -> Option<db::DbConn> {
    match db::try_connect(&config.database).await {
        Some(conn) => {
            tracing::info!("Database connection established");
            Some(conn)
        }
        None => {
            tracing::info!("Database not available - athletes will be stored in {}", config.server.data_dir.display());
            None
        }
    }
}

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    endpoints::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Start the HTTP server
async fn serve(app: Router, config: &Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
