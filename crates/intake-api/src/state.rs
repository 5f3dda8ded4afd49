//! Application state shared by all handlers.

use intake_db::RecordStore;
use intake_services::SubmissionPipeline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SubmissionPipeline>,
    /// Record store, probed by the readiness check.
    pub records: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(pipeline: Arc<SubmissionPipeline>, records: Arc<dyn RecordStore>) -> Self {
        Self { pipeline, records }
    }
}
