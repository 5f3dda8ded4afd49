//! Caller-supplied person data, before validation.

use serde::{Deserialize, Serialize};

/// Photo attached to a person: raw bytes plus what the client declared about them.
#[derive(Clone, Serialize, Deserialize)]
pub struct PhotoUpload {
    pub original_filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl PhotoUpload {
    pub fn new(
        original_filename: impl Into<String>,
        content_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            original_filename: original_filename.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// Size in bytes of the uploaded content.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

impl std::fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("original_filename", &self.original_filename)
            .field("content_type", &self.content_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// One person of a submission batch.
///
/// The photo is optional at the type level so that a form posted without a file
/// reaches validation and is rejected with the person's position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonInput {
    pub full_name: String,
    pub passport_number: String,
    pub date_of_birth: String,
    pub expiry_date: String,
    pub country: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    #[serde(skip)]
    pub photo: Option<PhotoUpload>,
}

impl PersonInput {
    /// Trim every text field and turn blank optional fields into `None`.
    pub fn normalized(mut self) -> Self {
        self.full_name = self.full_name.trim().to_string();
        self.passport_number = self.passport_number.trim().to_string();
        self.date_of_birth = self.date_of_birth.trim().to_string();
        self.expiry_date = self.expiry_date.trim().to_string();
        self.country = non_blank(self.country);
        self.email = non_blank(self.email);
        self.address = non_blank(self.address);
        self.phone_number = non_blank(self.phone_number);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
