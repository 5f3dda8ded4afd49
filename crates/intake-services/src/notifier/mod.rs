//! Operator notification: summary rendering and SMTP delivery.

pub mod email;
pub mod render;

use async_trait::async_trait;
use intake_core::models::SubmissionRecord;
use intake_core::NotifyError;

pub use email::EmailNotifier;
pub use render::{render_html, render_text};

/// Sends a rendered summary of accepted records to the operator.
///
/// Implementations do not retry; a failed delivery is reported once.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, records: &[SubmissionRecord]) -> Result<(), NotifyError>;
}
