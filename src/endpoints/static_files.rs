//! HTML pages and static assets.
//!
//! The landing page lives at `/`, the application under `/route/`. Every
//! `index.html` served under `/route` gets the runtime configuration
//! injected in place of its `config.js` tag.

use std::path::{Component, Path, PathBuf};

use axum::{
    extract::{Path as UrlPath, Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::services::html::inject_config;
use crate::state::AppState;

const HTML_MIME: &str = "text/html; charset=utf-8";

pub fn static_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(landing_page))
        .route("/index.html", get(landing_page))
        .route("/support", get(support_page))
        .route("/route", get(app_index))
        .route("/route/", get(app_index))
        .route("/route/index.html", get(app_index))
        .route("/route/{*path}", get(route_file))
}

/// Content type for a served file, by extension.
pub fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") => HTML_MIME,
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("ico") => "image/x-icon",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Resolve a request path below `root`, rejecting anything but plain components.
fn resolve(root: &Path, relative: &str) -> Option<PathBuf> {
    let relative = relative.trim_matches('/');
    let mut resolved = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(resolved)
}

fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Whether `file` lies at or below `dir`, compared lexically and then by
/// canonical path when both exist.
async fn is_within(file: &Path, dir: &Path) -> bool {
    if dir.as_os_str().is_empty() {
        return false;
    }
    if lexical(file).starts_with(lexical(dir)) {
        return true;
    }
    match (
        tokio::fs::canonicalize(file).await,
        tokio::fs::canonicalize(dir).await,
    ) {
        (Ok(file), Ok(dir)) => file.starts_with(dir),
        _ => false,
    }
}

/// Answer 404 for anything inside the athlete data directory, which may
/// sit below the static root.
pub async fn hide_data_dir(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    let relative = path
        .strip_prefix("/route")
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(path);
    let decoded = urlencoding::decode(relative)
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| relative.to_string());

    if let Some(file) = resolve(&state.config.server.static_dir, &decoded) {
        if is_within(&file, &state.config.server.data_dir).await {
            tracing::warn!(path = %path, "Refused request for athlete data");
            return AppError::NotFound(format!("File Not Found: {}", path)).into_response();
        }
    }

    next.run(req).await
}

fn html_response(body: String) -> Response {
    ([(header::CONTENT_TYPE, HTML_MIME)], body).into_response()
}

async fn read_html(path: &Path) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(html) => Ok(html),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Cannot read page: {}", e);
            Err(AppError::NotFound(format!(
                "File Not Found: {}",
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            )))
        }
    }
}

async fn landing_page(State(state): State<AppState>) -> Result<Response> {
    let html = read_html(&state.config.server.static_dir.join("landing.html")).await?;
    Ok(html_response(html))
}

async fn support_page(State(state): State<AppState>) -> Result<Response> {
    let html = read_html(&state.config.server.static_dir.join("support.html"))
        .await
        .map_err(|_| AppError::NotFound("Support page not found".to_string()))?;
    Ok(html_response(html))
}

async fn app_index(State(state): State<AppState>) -> Result<Response> {
    let html = read_html(&state.config.server.static_dir.join("index.html")).await?;
    Ok(html_response(inject_config(&html, &state.config)))
}

async fn route_file(
    State(state): State<AppState>,
    UrlPath(path): UrlPath<String>,
) -> Result<Response> {
    let root = &state.config.server.static_dir;
    let mut file = resolve(root, &path)
        .ok_or_else(|| AppError::NotFound(format!("File Not Found: {}", path)))?;

    if tokio::fs::metadata(&file).await.map(|m| m.is_dir()).unwrap_or(false) {
        file.push("index.html");
    }

    let is_file = tokio::fs::metadata(&file)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        tracing::debug!(path = %file.display(), "Route file not found");
        return Err(AppError::NotFound(format!("File Not Found: {}", path)));
    }

    let mime = mime_for(&file);
    if mime == HTML_MIME {
        let html = read_html(&file).await?;
        let is_index = file.file_name().and_then(|n| n.to_str()) == Some("index.html");
        let body = if is_index {
            inject_config(&html, &state.config)
        } else {
            html
        };
        return Ok(html_response(body));
    }

    let bytes = tokio::fs::read(&file).await?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}
