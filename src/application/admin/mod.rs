//! Application services for the administrative surface.
//!
//! Every mutation validates, persists, invalidates the affected public
//! pages and reports back a single message. Authentication happens before
//! any of these services is reached.

pub mod auth;
pub mod content;
pub mod leads;
pub mod media;
pub mod settings;
pub mod users;

pub use auth::{AuthError, AuthService, SessionClaims};
pub use content::{AdminContentError, AdminContentService, ContentSaved};
pub use leads::{AdminLeadError, AdminLeadService};
pub use media::{AdminMediaService, MediaError, MediaStorage, StorageError, UploadRequest};
pub use settings::{AdminSettingsError, AdminSettingsService};
pub use users::{AdminUserService, UserAdminError};

use serde::Serialize;
use uuid::Uuid;

/// Body returned to the admin panel after a mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ActionResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Outcome of reading an `id` form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormId {
    Missing,
    Malformed,
    Present(Uuid),
}

pub(crate) fn form_id(raw: Option<&str>) -> FormId {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => FormId::Missing,
        Some(value) => match Uuid::parse_str(value) {
            Ok(id) => FormId::Present(id),
            Err(_) => FormId::Malformed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_result_omits_empty_fields() {
        let body = serde_json::to_value(ActionResult::success("File uploaded.").with_url("u"))
            .expect("serialize");
        assert_eq!(body, serde_json::json!({ "success": "File uploaded.", "url": "u" }));

        let body = serde_json::to_value(ActionResult::failure("nope")).expect("serialize");
        assert_eq!(body, serde_json::json!({ "error": "nope" }));
    }

    #[test]
    fn form_id_distinguishes_blank_and_malformed() {
        assert_eq!(form_id(None), FormId::Missing);
        assert_eq!(form_id(Some("  ")), FormId::Missing);
        assert_eq!(form_id(Some("abc")), FormId::Malformed);
        let id = Uuid::new_v4();
        assert_eq!(form_id(Some(&id.to_string())), FormId::Present(id));
    }
}
