use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;
use crate::state::AppState;

/// Paths exempt from rate limiting.
const UNLIMITED_PATHS: [&str; 2] = ["/health", "/healthcheck"];

fn client_ip(req: &Request) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Reject clients that exceed the per-address request budget with 429.
pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if UNLIMITED_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let ip = client_ip(&req);
    if !state.rate_limiter.check(ip) {
        tracing::warn!(%ip, path = %req.uri().path(), "Rate limit exceeded");
        return AppError::TooManyRequests.into_response();
    }

    next.run(req).await
}
