//! Liveness and readiness probes.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::state::AppState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the record store answers within the timeout.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (ready, database) =
        match tokio::time::timeout(READINESS_TIMEOUT, state.records.ping()).await {
            Ok(Ok(())) => (true, "ready"),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Database readiness check failed");
                (false, "not_ready")
            }
            Err(_) => {
                tracing::error!("Database readiness check timed out");
                (false, "timeout")
            }
        };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "database": database,
        })),
    )
}
