//! Passport Intake Services Layer
//!
//! Business services: the submission pipeline, the operator notifier and the
//! retention sweeper. The API and CLI crates stay thin and delegate here.

pub mod notifier;
pub mod pipeline;
pub mod retention;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use intake_db::RecordStore;
pub use intake_storage::{DeleteOutcome, PhotoStore};
pub use notifier::{render_html, render_text, EmailNotifier, Notifier};
pub use pipeline::{PipelineConfig, SubmissionPipeline};
pub use retention::{RetentionSweeper, SweepReport, SweepState};
