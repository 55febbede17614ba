//! Public lead forms: the full consultation form and the short audit form.

use serde::{Deserialize, Serialize};

use crate::domain::types::LeadType;

use super::{FieldErrors, Fields, FormData};

/// Body of the consultation form as posted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsultationSubmission {
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub business_name: String,
    pub industry: String,
    pub package_interest: String,
    pub budget_range: String,
    pub preferred_contact_method: String,
    pub preferred_contact_value: Option<String>,
    pub message_goals: String,
}

impl ConsultationSubmission {
    fn to_form(&self) -> FormData {
        FormData::new()
            .with("fullName", self.full_name.as_str())
            .with("email", self.email.as_str())
            .with("mobileNumber", self.mobile_number.as_str())
            .with("businessName", self.business_name.as_str())
            .with("industry", self.industry.as_str())
            .with("packageInterest", self.package_interest.as_str())
            .with("budgetRange", self.budget_range.as_str())
            .with("preferredContactMethod", self.preferred_contact_method.as_str())
            .with(
                "preferredContactValue",
                self.preferred_contact_value.clone().unwrap_or_default(),
            )
            .with("messageGoals", self.message_goals.as_str())
    }

    /// Field values in a fixed order, used for duplicate detection.
    pub fn fingerprint_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("fullName", self.full_name.as_str()),
            ("email", self.email.as_str()),
            ("mobileNumber", self.mobile_number.as_str()),
            ("businessName", self.business_name.as_str()),
            ("industry", self.industry.as_str()),
            ("packageInterest", self.package_interest.as_str()),
            ("budgetRange", self.budget_range.as_str()),
            ("preferredContactMethod", self.preferred_contact_method.as_str()),
            (
                "preferredContactValue",
                self.preferred_contact_value.as_deref().unwrap_or_default(),
            ),
            ("messageGoals", self.message_goals.as_str()),
        ]
    }
}

/// Body of the free website audit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuditSubmission {
    pub full_name: String,
    pub email: String,
    pub business_name: String,
    pub website_or_facebook_link: String,
}

impl AuditSubmission {
    fn to_form(&self) -> FormData {
        FormData::new()
            .with("fullName", self.full_name.as_str())
            .with("email", self.email.as_str())
            .with("businessName", self.business_name.as_str())
            .with("websiteOrFacebookLink", self.website_or_facebook_link.as_str())
    }

    pub fn fingerprint_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("fullName", self.full_name.as_str()),
            ("email", self.email.as_str()),
            ("businessName", self.business_name.as_str()),
            (
                "websiteOrFacebookLink",
                self.website_or_facebook_link.as_str(),
            ),
        ]
    }
}

/// Validated lead ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLead {
    pub full_name: String,
    pub email: String,
    pub mobile_number: String,
    pub business_name: String,
    pub website_or_facebook_link: Option<String>,
    pub industry: String,
    pub package_interest: String,
    pub budget_range: String,
    pub preferred_contact_method: String,
    pub preferred_contact_value: Option<String>,
    pub message_goals: String,
    pub lead_type: LeadType,
}

pub const AUDIT_PLACEHOLDER: &str = "N/A";
pub const AUDIT_PACKAGE_INTEREST: &str = "Audit";
pub const AUDIT_CONTACT_METHOD: &str = "Email";
pub const AUDIT_MESSAGE: &str = "Requested free website audit.";

pub fn validate_consultation(input: &ConsultationSubmission) -> Result<NewLead, FieldErrors> {
    let form = input.to_form();
    let mut fields = Fields::new(&form);

    let full_name = fields.text("fullName", "Full name", 2);
    let email = fields.email("email");
    let mobile_number = fields.text("mobileNumber", "Mobile number", 8);
    let business_name = fields.text("businessName", "Business name", 2);
    let industry = fields.text("industry", "Industry", 2);
    let package_interest = fields.text("packageInterest", "Package", 2);
    let budget_range = fields.text("budgetRange", "Budget range", 2);
    let preferred_contact_method =
        fields.text("preferredContactMethod", "Preferred contact method", 2);
    let preferred_contact_value = fields.optional_text("preferredContactValue");
    let message_goals =
        fields.text_with("messageGoals", 1, "Please enter your message or goals.");

    fields.finish(NewLead {
        full_name,
        email,
        mobile_number,
        business_name,
        website_or_facebook_link: None,
        industry,
        package_interest,
        budget_range,
        preferred_contact_method,
        preferred_contact_value,
        message_goals,
        lead_type: LeadType::Consultation,
    })
}

/// Validate an audit request and fill the columns the short form never asks for.
pub fn validate_audit(input: &AuditSubmission) -> Result<NewLead, FieldErrors> {
    let form = input.to_form();
    let mut fields = Fields::new(&form);

    let full_name = fields.text("fullName", "Full name", 2);
    let email = fields.email("email");
    let business_name = fields.text("businessName", "Business name", 2);
    let link = input.website_or_facebook_link.trim().to_string();
    if !super::is_valid_url(&link) {
        fields.fail(
            "websiteOrFacebookLink",
            "Please provide a valid website or Facebook link.",
        );
    }

    fields.finish(NewLead {
        full_name,
        preferred_contact_value: Some(email.clone()),
        email,
        mobile_number: AUDIT_PLACEHOLDER.to_string(),
        business_name,
        website_or_facebook_link: Some(link),
        industry: AUDIT_PLACEHOLDER.to_string(),
        package_interest: AUDIT_PACKAGE_INTEREST.to_string(),
        budget_range: AUDIT_PLACEHOLDER.to_string(),
        preferred_contact_method: AUDIT_CONTACT_METHOD.to_string(),
        message_goals: AUDIT_MESSAGE.to_string(),
        lead_type: LeadType::Audit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn juan() -> ConsultationSubmission {
        ConsultationSubmission {
            full_name: "Juan Dela Cruz".into(),
            email: "juan@example.com".into(),
            mobile_number: "09171234567".into(),
            business_name: "Juan's Cafe".into(),
            industry: "Retail".into(),
            package_interest: "Startup".into(),
            budget_range: "PHP 15,000 - 30,000".into(),
            preferred_contact_method: "Email".into(),
            preferred_contact_value: None,
            message_goals: "Need a new site".into(),
        }
    }

    #[test]
    fn valid_consultation_becomes_consultation_lead() {
        let lead = validate_consultation(&juan()).expect("valid");
        assert_eq!(lead.lead_type, LeadType::Consultation);
        assert_eq!(lead.full_name, "Juan Dela Cruz");
        assert!(lead.website_or_facebook_link.is_none());
    }

    #[test]
    fn missing_message_uses_friendly_text() {
        let mut input = juan();
        input.message_goals = "   ".into();
        let errors = validate_consultation(&input).unwrap_err();
        assert_eq!(
            errors.to_map().get("messageGoals").map(String::as_str),
            Some("Please enter your message or goals.")
        );
    }

    #[test]
    fn short_mobile_number_is_rejected() {
        let mut input = juan();
        input.mobile_number = "0917".into();
        let errors = validate_consultation(&input).unwrap_err();
        assert!(errors.has("mobileNumber"));
    }

    #[test]
    fn audit_fills_placeholders() {
        let lead = validate_audit(&AuditSubmission {
            full_name: "Maria Santos".into(),
            email: "maria@example.com".into(),
            business_name: "Santos Dental".into(),
            website_or_facebook_link: "https://facebook.com/santosdental".into(),
        })
        .expect("valid");

        assert_eq!(lead.lead_type, LeadType::Audit);
        assert_eq!(lead.mobile_number, "N/A");
        assert_eq!(lead.industry, "N/A");
        assert_eq!(lead.package_interest, "Audit");
        assert_eq!(lead.preferred_contact_method, "Email");
        assert_eq!(lead.preferred_contact_value.as_deref(), Some("maria@example.com"));
        assert_eq!(lead.message_goals, "Requested free website audit.");
    }

    #[test]
    fn audit_rejects_invalid_link() {
        let errors = validate_audit(&AuditSubmission {
            full_name: "Maria Santos".into(),
            email: "maria@example.com".into(),
            business_name: "Santos Dental".into(),
            website_or_facebook_link: "not-a-url".into(),
        })
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.to_map().get("websiteOrFacebookLink").map(String::as_str),
            Some("Please provide a valid website or Facebook link.")
        );
    }
}
