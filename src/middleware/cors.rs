use axum::{
    body::Body,
    extract::Request,
    middleware::Next,
    response::Response,
};
use http::{header, HeaderValue, Method, StatusCode};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::Config;

/// CORS policy: any origin is mirrored in development, production only
/// admits the configured origins.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins = if config.is_production() {
        let allowed: Vec<HeaderValue> = config
            .server
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(allowed)
    } else {
        AllowOrigin::mirror_request()
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Answer bare `OPTIONS` requests that are not CORS preflights.
pub async fn answer_options(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        return response;
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::test_config;
    use axum::{middleware, routing::get, Router};
    use http::Request;
    use tower::ServiceExt;

    fn app(config: &Config) -> Router {
        Router::new()
            .route("/api/templates", get(|| async { "ok" }))
            .layer(middleware::from_fn(answer_options))
            .layer(cors_layer(config))
    }

    #[tokio::test]
    async fn test_development_mirrors_origin() {
        let response = app(&test_config(&[]))
            .oneshot(
                Request::builder()
                    .uri("/api/templates")
                    .header("origin", "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-credentials")
                .unwrap(),
            "true"
        );
    }

    #[tokio::test]
    async fn test_production_rejects_unknown_origin() {
        let config = test_config(&[
            ("ENVIRONMENT", "production"),
            ("ALLOWED_ORIGINS", "https://addicted.design"),
        ]);

        let response = app(&config)
            .oneshot(
                Request::builder()
                    .uri("/api/templates")
                    .header("origin", "https://evil.example")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response
            .headers()
            .get("access-control-allow-origin")
            .is_none());

        let response = app(&config)
            .oneshot(
                Request::builder()
                    .uri("/api/templates")
                    .header("origin", "https://addicted.design")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "https://addicted.design"
        );
    }

    #[tokio::test]
    async fn test_plain_options_is_ok() {
        let response = app(&test_config(&[]))
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
