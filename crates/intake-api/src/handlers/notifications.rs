//! Standalone notification endpoint for records that are already stored.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use intake_core::models::SubmissionRecord;
use intake_core::NotifyError;
use serde::{Deserialize, Serialize};

use crate::error::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    pub persons: Vec<SubmissionRecord>,
}

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[tracing::instrument(skip_all, fields(persons = request.persons.len()))]
pub async fn send_notification(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<NotificationRequest>,
) -> impl IntoResponse {
    match state.pipeline.notify(&request.persons).await {
        Ok(()) => (
            StatusCode::OK,
            Json(NotificationResponse {
                ok: true,
                error: None,
            }),
        ),
        Err(e) => {
            let status = match e {
                NotifyError::Empty => StatusCode::BAD_REQUEST,
                NotifyError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            tracing::warn!(error = %e, "Notification request failed");
            (
                status,
                Json(NotificationResponse {
                    ok: false,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
