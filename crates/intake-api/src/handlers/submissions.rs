//! Submission endpoint: multipart form in, accepted records out.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use intake_core::models::{NotificationStatus, StoredSubmission, SubmissionOutcome};
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::multipart::extract_persons;

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    /// Human-readable outcome, shown as-is to the submitter.
    pub status: String,
    pub code: &'static str,
    pub accepted: Vec<StoredSubmission>,
    pub notification: NotificationStatus,
}

impl From<SubmissionOutcome> for SubmissionResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            status: outcome.status_message(),
            code: outcome.status_code(),
            accepted: outcome.records,
            notification: outcome.notification,
        }
    }
}

#[tracing::instrument(skip_all)]
pub async fn create_submission(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let persons = extract_persons(multipart?).await?;

    tracing::debug!(persons = persons.len(), "Submission form decoded");

    let outcome = state.pipeline.submit(persons).await?;

    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(outcome))))
}
