//! Persisted submission records and pipeline outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::person::PersonInput;

/// A person's data as written to the record store and sent to the operator.
///
/// `photo_url` is always set: a record is only built after its photo upload
/// succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub full_name: String,
    pub passport_number: String,
    pub date_of_birth: String,
    pub expiry_date: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub photo_url: String,
}

impl SubmissionRecord {
    pub fn from_person(person: &PersonInput, photo_url: String) -> Self {
        Self {
            full_name: person.full_name.clone(),
            passport_number: person.passport_number.clone(),
            date_of_birth: person.date_of_birth.clone(),
            expiry_date: person.expiry_date.clone(),
            country: person.country.clone(),
            email: person.email.clone(),
            address: person.address.clone(),
            phone_number: person.phone_number.clone(),
            photo_url,
        }
    }
}

/// A record as read back from the store, with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: SubmissionRecord,
}

/// Outcome of the best-effort notification step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum NotificationStatus {
    Sent,
    Failed(String),
}

impl NotificationStatus {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationStatus::Sent)
    }
}

/// A durably accepted submission.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub records: Vec<StoredSubmission>,
    pub notification: NotificationStatus,
}

impl SubmissionOutcome {
    /// Human-readable status shown to the submitter.
    pub fn status_message(&self) -> String {
        match &self.notification {
            NotificationStatus::Sent => "Data saved and email sent successfully".to_string(),
            NotificationStatus::Failed(reason) => format!(
                "Data saved, but the notification email could not be sent: {}",
                reason
            ),
        }
    }

    /// Machine-readable outcome code.
    pub fn status_code(&self) -> &'static str {
        match self.notification {
            NotificationStatus::Sent => "SUCCESS",
            NotificationStatus::Failed(_) => "NOTIFY_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            full_name: "Jane Doe".to_string(),
            passport_number: "X1".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            expiry_date: "2030-01-01".to_string(),
            country: None,
            email: None,
            address: None,
            phone_number: None,
            photo_url: "http://localhost/passport-photos/1_Jane_Doe.jpg".to_string(),
        }
    }

    #[test]
    fn stored_submission_serializes_flat() {
        let stored = StoredSubmission {
            id: Uuid::nil(),
            created_at: Utc::now(),
            record: record(),
        };
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["full_name"], "Jane Doe");
        assert!(json.get("record").is_none());
    }

    #[test]
    fn record_accepts_missing_optionals() {
        let json = serde_json::json!({
            "full_name": "Jane Doe",
            "passport_number": "X1",
            "date_of_birth": "1990-01-01",
            "expiry_date": "2030-01-01",
            "photo_url": "http://x/y/z.jpg"
        });
        let parsed: SubmissionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.email, None);
    }

    #[test]
    fn status_message_reflects_notification() {
        let ok = SubmissionOutcome {
            records: vec![],
            notification: NotificationStatus::Sent,
        };
        assert_eq!(ok.status_code(), "SUCCESS");
        assert!(ok.status_message().contains("email sent"));

        let degraded = SubmissionOutcome {
            records: vec![],
            notification: NotificationStatus::Failed("smtp down".to_string()),
        };
        assert_eq!(degraded.status_code(), "NOTIFY_FAILED");
        assert!(degraded.status_message().contains("smtp down"));
    }
}
