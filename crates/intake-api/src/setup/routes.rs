//! Router, CORS and HTTP layers.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use intake_core::constants::{API_PREFIX, MAX_PERSONS_PER_SUBMISSION, MAX_PHOTO_SIZE_BYTES};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, notifications, submissions};
use crate::state::AppState;

/// Room for text fields and multipart framing on top of the photos.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Largest request body a full batch can produce.
pub const MAX_REQUEST_BODY_BYTES: usize =
    MAX_PERSONS_PER_SUBMISSION * MAX_PHOTO_SIZE_BYTES + FORM_OVERHEAD_BYTES;

/// Setup all application routes
pub fn setup_routes(cors_origins: &[String], state: Arc<AppState>) -> Router {
    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(1024)
        .max(1);
    tracing::info!(
        http_concurrency_limit,
        max_body_bytes = MAX_REQUEST_BODY_BYTES,
        "HTTP limits configured"
    );

    Router::new()
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            &format!("{}/submissions", API_PREFIX),
            post(submissions::create_submission),
        )
        .route(
            &format!("{}/notifications", API_PREFIX),
            post(notifications::send_notification),
        )
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(DefaultBodyLimit::disable())
        .layer(setup_cors(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn setup_cors(cors_origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    }
}
