//! HTTP security headers middleware
//!
//! Adds security and cache-control headers to every response. Production
//! responses carry a strict Content-Security-Policy and HSTS; development
//! responses get a permissive policy so local tooling keeps working.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderValue;

use crate::state::AppState;

const PRODUCTION_CSP: &str = "default-src 'self'; \
script-src 'self' 'unsafe-inline'; \
style-src 'self' 'unsafe-inline'; \
img-src 'self' data: https:; \
connect-src 'self' https://www.strava.com; \
font-src 'self'; \
object-src 'none'; \
base-uri 'self'; \
form-action 'self'; \
frame-ancestors 'none';";

const DEVELOPMENT_CSP: &str = "default-src 'self' * 'unsafe-inline' 'unsafe-eval'; \
script-src * 'unsafe-inline' 'unsafe-eval'; \
style-src * 'unsafe-inline'; \
img-src * data: blob:; \
connect-src *;";

/// Headers sent regardless of environment.
const COMMON_HEADERS: [(&str, &str); 8] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
    ("cache-control", "no-cache, no-store, must-revalidate"),
    ("pragma", "no-cache"),
    ("expires", "0"),
];

pub async fn add_security_headers(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    for (name, value) in COMMON_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    if state.config.is_production() {
        headers.insert(
            "content-security-policy",
            HeaderValue::from_static(PRODUCTION_CSP),
        );
        headers.insert(
            "strict-transport-security",
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        );
    } else {
        headers.insert(
            "content-security-policy",
            HeaderValue::from_static(DEVELOPMENT_CSP),
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_state;
    use axum::{body::Body, middleware, routing::get, Router};
    use http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn dummy_handler() -> &'static str {
        "ok"
    }

    fn test_app(state: AppState) -> Router {
        Router::new()
            .route("/test", get(dummy_handler))
            .layer(middleware::from_fn_with_state(state, add_security_headers))
    }

    async fn get_test(state: AppState) -> Response {
        test_app(state)
            .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_common_headers_present() {
        let response = get_test(test_state(None, &[])).await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(
            headers.get("referrer-policy").unwrap(),
            "strict-origin-when-cross-origin"
        );
        assert_eq!(headers.get("x-xss-protection").unwrap(), "1; mode=block");
        assert_eq!(headers.get("pragma").unwrap(), "no-cache");
        assert_eq!(headers.get("expires").unwrap(), "0");
        assert!(headers.contains_key("permissions-policy"));
    }

    #[tokio::test]
    async fn test_development_policy_is_permissive() {
        let response = get_test(test_state(None, &[])).await;

        let csp = response
            .headers()
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.contains("'unsafe-eval'"));
        assert!(!response.headers().contains_key("strict-transport-security"));
    }

    #[tokio::test]
    async fn test_production_policy_is_strict() {
        let response = get_test(test_state(None, &[("ENVIRONMENT", "production")])).await;

        let csp = response
            .headers()
            .get("content-security-policy")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(csp.starts_with("default-src 'self';"));
        assert!(csp.contains("connect-src 'self' https://www.strava.com"));
        assert!(csp.contains("frame-ancestors 'none'"));
        assert_eq!(
            response.headers().get("strict-transport-security").unwrap(),
            "max-age=31536000; includeSubDomains"
        );
    }
}
