pub mod person;
pub mod submission;

pub use person::{PersonInput, PhotoUpload};
pub use submission::{NotificationStatus, StoredSubmission, SubmissionOutcome, SubmissionRecord};
