//! Input validation for every form the site accepts.
//!
//! Validators are pure: they read raw string fields and produce either a typed
//! payload or a [`FieldErrors`] list. Admin actions surface the first error;
//! public forms return the whole map keyed by field name.

use std::collections::BTreeMap;
use std::fmt;

use lettre::Address;
use serde::Deserialize;
use url::Url;

pub mod content;
pub mod leads;
pub mod settings;
pub mod users;

pub use content::{
    FaqPayload, GalleryImage, PortfolioPayload, PricingPackagePayload, ProcessStepPayload,
    ProjectCategoryPayload, ServicePayload, TestimonialPayload,
};
pub use leads::{AuditSubmission, ConsultationSubmission, NewLead};
pub use settings::SiteSettingsPayload;
pub use users::{LoginPayload, NewUserPayload, PasswordChangePayload};

/// Raw string-keyed form submission. Repeated keys keep their order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<(String, String)>")]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// First value submitted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|(name, _)| name == key)
    }

    /// Trimmed value, treating blank input as absent.
    pub fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|value| !value.is_empty())
    }
}

impl From<Vec<(String, String)>> for FormData {
    fn from(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Ordered list of field-level validation failures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn first(&self) -> Option<&FieldError> {
        self.errors.first()
    }

    pub fn first_message(&self) -> &str {
        self.first()
            .map(|error| error.message.as_str())
            .unwrap_or("Invalid input.")
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// One message per field, keeping the first failure reported for it.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field.to_string())
                .or_insert_with(|| error.message.clone());
        }
        map
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.first_message())
    }
}

impl std::error::Error for FieldErrors {}

/// Cursor over a [`FormData`] that accumulates errors while extracting fields.
pub(crate) struct Fields<'a> {
    form: &'a FormData,
    errors: FieldErrors,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(form: &'a FormData) -> Self {
        Self {
            form,
            errors: FieldErrors::default(),
        }
    }

    pub(crate) fn fail(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(field, message);
    }

    pub(crate) fn has_error(&self, field: &str) -> bool {
        self.errors.has(field)
    }

    pub(crate) fn present(&self, key: &str) -> bool {
        self.form.contains(key)
    }

    /// Required text trimmed to at least `min` characters.
    pub(crate) fn text(&mut self, key: &'static str, label: &str, min: usize) -> String {
        let value = self.form.get(key).unwrap_or_default().trim().to_string();
        check_min(&mut self.errors, key, label, &value, min);
        value
    }

    /// Required text with a custom failure message.
    pub(crate) fn text_with(&mut self, key: &'static str, min: usize, message: &str) -> String {
        let value = self.form.get(key).unwrap_or_default().trim().to_string();
        if value.chars().count() < min {
            self.errors.push(key, message);
        }
        value
    }

    pub(crate) fn optional_text(&self, key: &str) -> Option<String> {
        self.form.non_blank(key).map(str::to_string)
    }

    pub(crate) fn email(&mut self, key: &'static str) -> String {
        let value = self.form.get(key).unwrap_or_default().trim().to_string();
        if !is_valid_email(&value) {
            self.errors.push(key, "Please enter a valid email address.");
        }
        value
    }

    pub(crate) fn optional_email(&mut self, key: &'static str) -> Option<String> {
        let value = self.optional_text(key)?;
        if !is_valid_email(&value) {
            self.errors.push(key, "Please enter a valid email address.");
        }
        Some(value)
    }

    pub(crate) fn optional_url(&mut self, key: &'static str, label: &str) -> Option<String> {
        let value = self.optional_text(key)?;
        if !is_valid_url(&value) {
            self.errors.push(key, format!("{label} must be a valid URL."));
        }
        Some(value)
    }

    /// Non-negative integer; blank input counts as zero.
    pub(crate) fn position(&mut self, key: &'static str) -> i32 {
        self.non_negative(key, "Position")
    }

    pub(crate) fn non_negative(&mut self, key: &'static str, label: &str) -> i32 {
        let Some(raw) = self.form.non_blank(key) else {
            return 0;
        };
        match raw.parse::<i32>() {
            Ok(value) if value >= 0 => value,
            Ok(_) => {
                self.errors
                    .push(key, format!("{label} must be zero or greater."));
                0
            }
            Err(_) => {
                self.errors.push(key, format!("{label} must be a whole number."));
                0
            }
        }
    }

    pub(crate) fn checkbox(&self, key: &str) -> bool {
        parse_checkbox_flag(self.form.get(key))
    }

    pub(crate) fn list(&self, key: &str) -> Vec<String> {
        parse_list(self.form.get(key).unwrap_or_default())
    }

    pub(crate) fn list_min(&mut self, key: &'static str, label: &str, min: usize) -> Vec<String> {
        let values = self.list(key);
        if values.len() < min {
            self.errors
                .push(key, format!("{label} must include at least {min} item."));
        }
        values
    }

    pub(crate) fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

pub(crate) fn check_min(
    errors: &mut FieldErrors,
    key: &'static str,
    label: &str,
    value: &str,
    min: usize,
) {
    if min == 0 {
        return;
    }
    if value.is_empty() {
        errors.push(key, format!("{label} is required."));
    } else if value.chars().count() < min {
        errors.push(key, format!("{label} must be at least {min} characters."));
    }
}

/// Split newline-delimited text into trimmed, non-empty entries.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// HTML checkboxes submit `on` when ticked and nothing otherwise.
pub fn parse_checkbox_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|raw| raw.trim().to_ascii_lowercase()),
        Some(ref flag) if flag == "on" || flag == "true" || flag == "1"
    )
}

/// Mailbox syntax as lettre parses it, plus a dotted domain so `juan@localhost` is refused.
pub fn is_valid_email(value: &str) -> bool {
    match value.parse::<Address>() {
        Ok(address) => {
            let domain = address.domain();
            domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        Err(_) => false,
    }
}

pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_list_trims_and_drops_blank_lines() {
        let parsed = parse_list("  Landing page \n\n\r\nSEO setup\n   \nHosting  ");
        assert_eq!(parsed, vec!["Landing page", "SEO setup", "Hosting"]);
    }

    #[test]
    fn checkbox_flag_accepts_browser_values() {
        assert!(parse_checkbox_flag(Some("on")));
        assert!(parse_checkbox_flag(Some("true")));
        assert!(!parse_checkbox_flag(Some("off")));
        assert!(!parse_checkbox_flag(None));
    }

    #[test]
    fn email_and_url_checks() {
        assert!(is_valid_email("juan@example.com"));
        assert!(!is_valid_email("juan@example"));
        assert!(!is_valid_email("juan example@test.com"));
        assert!(!is_valid_email("juan@@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(is_valid_url("https://facebook.com/juanscafe"));
        assert!(!is_valid_url("not-a-url"));
        assert!(!is_valid_url("ftp://files.example.com"));
    }

    #[test]
    fn field_map_keeps_first_message_per_field() {
        let mut errors = FieldErrors::default();
        errors.push("email", "first");
        errors.push("email", "second");
        errors.push("fullName", "name");

        let map = errors.to_map();
        assert_eq!(map.get("email").map(String::as_str), Some("first"));
        assert_eq!(errors.first_message(), "first");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn position_rejects_negative_and_non_numeric() {
        let form = FormData::new()
            .with("a", "-1")
            .with("b", "abc")
            .with("c", " 7 ");
        let mut fields = Fields::new(&form);
        assert_eq!(fields.position("a"), 0);
        assert_eq!(fields.position("b"), 0);
        assert_eq!(fields.position("c"), 7);
        assert_eq!(fields.position("missing"), 0);
        let errors = fields.finish(()).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
