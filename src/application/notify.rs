//! Best-effort email notification of new leads.
//!
//! A lead is already stored by the time it reaches the dispatcher, so
//! nothing here can fail the submission: provider errors are logged and
//! counted, then dropped.

use std::sync::Arc;

use ammonia::clean_text;
use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::entities::LeadRecord;
use crate::domain::types::LeadType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub reply_to: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("email provider `{provider}` rejected the message: {message}")]
    Rejected {
        provider: &'static str,
        message: String,
    },
    #[error("email provider `{provider}` is unreachable: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },
    #[error("invalid email message: {0}")]
    InvalidMessage(String),
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Receives every stored lead. Implementations never report failure.
#[async_trait]
pub trait LeadNotifier: Send + Sync {
    async fn notify(&self, lead: &LeadRecord);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Sent { provider: &'static str },
    NoRecipient,
    Undelivered,
}

/// Tries the primary provider, then the fallback.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    recipient: Option<String>,
    primary: Option<Arc<dyn EmailProvider>>,
    fallback: Option<Arc<dyn EmailProvider>>,
}

impl NotificationDispatcher {
    pub fn new(
        recipient: Option<String>,
        primary: Option<Arc<dyn EmailProvider>>,
        fallback: Option<Arc<dyn EmailProvider>>,
    ) -> Self {
        Self {
            recipient: recipient.filter(|value| !value.trim().is_empty()),
            primary,
            fallback,
        }
    }

    pub async fn dispatch(&self, lead: &LeadRecord) -> DispatchOutcome {
        let Some(recipient) = self.recipient.as_deref() else {
            debug!(
                target = "jdigital::application::notify",
                lead_id = %lead.id,
                "no notification recipient configured; skipping"
            );
            return DispatchOutcome::NoRecipient;
        };

        let message = lead_email(lead, recipient);
        let providers = [self.primary.as_ref(), self.fallback.as_ref()];
        let mut attempted = false;

        for provider in providers.into_iter().flatten() {
            attempted = true;
            match provider.send(&message).await {
                Ok(()) => {
                    info!(
                        target = "jdigital::application::notify",
                        lead_id = %lead.id,
                        provider = provider.name(),
                        "lead notification sent"
                    );
                    return DispatchOutcome::Sent {
                        provider: provider.name(),
                    };
                }
                Err(err) => {
                    error!(
                        target = "jdigital::application::notify",
                        lead_id = %lead.id,
                        provider = provider.name(),
                        error = %err,
                        "lead notification delivery failed"
                    );
                }
            }
        }

        counter!("jdigital_notifications_failed_total").increment(1);
        if attempted {
            warn!(
                target = "jdigital::application::notify",
                lead_id = %lead.id,
                "every email provider failed; lead notification dropped"
            );
        } else {
            warn!(
                target = "jdigital::application::notify",
                lead_id = %lead.id,
                "no email provider configured; set notifications.resend_api_key or SMTP credentials"
            );
        }
        DispatchOutcome::Undelivered
    }
}

#[async_trait]
impl LeadNotifier for NotificationDispatcher {
    async fn notify(&self, lead: &LeadRecord) {
        self.dispatch(lead).await;
    }
}

const WRAPPER_STYLE: &str = "font-family:Arial,sans-serif;max-width:680px;margin:0 auto;padding:24px";

pub fn lead_email(lead: &LeadRecord, to: &str) -> EmailMessage {
    let (subject, html) = match lead.lead_type {
        LeadType::Consultation => consultation_email(lead),
        LeadType::Audit => audit_email(lead),
    };
    EmailMessage {
        to: to.to_string(),
        subject,
        html,
        reply_to: lead.email.clone(),
    }
}

fn consultation_email(lead: &LeadRecord) -> (String, String) {
    let subject = format!("New Lead: {} ({})", lead.full_name, lead.package_interest);
    let contact_value = lead
        .preferred_contact_value
        .as_deref()
        .filter(|value| !value.is_empty())
        .unwrap_or("Not provided");

    let rows = [
        ("Name", lead.full_name.as_str()),
        ("Email", lead.email.as_str()),
        ("Mobile", lead.mobile_number.as_str()),
        ("Business", lead.business_name.as_str()),
        ("Industry", lead.industry.as_str()),
        ("Package", lead.package_interest.as_str()),
        ("Budget", lead.budget_range.as_str()),
        ("Preferred Contact", lead.preferred_contact_method.as_str()),
        ("Preferred Contact Details", contact_value),
    ];

    let mut html = format!("<div style=\"{WRAPPER_STYLE}\"><h2>New Consultation Inquiry</h2>");
    for (label, value) in rows {
        html.push_str(&field_row(label, value));
    }
    html.push_str("<p><strong>Message/Goals:</strong></p>");
    html.push_str(&format!("<p>{}</p></div>", clean_text(&lead.message_goals)));
    (subject, html)
}

fn audit_email(lead: &LeadRecord) -> (String, String) {
    let subject = format!(
        "New Audit Request: {} ({})",
        lead.full_name, lead.business_name
    );
    let link = clean_text(lead.website_or_facebook_link.as_deref().unwrap_or_default());

    let mut html =
        format!("<div style=\"{WRAPPER_STYLE}\"><h2>New Free Website Audit Request</h2>");
    html.push_str(&field_row("Name", &lead.full_name));
    html.push_str(&field_row("Email", &lead.email));
    html.push_str(&field_row("Business", &lead.business_name));
    html.push_str(&format!(
        "<p><strong>Website/Facebook Link:</strong> <a href=\"{link}\">{link}</a></p></div>"
    ));
    (subject, html)
}

fn field_row(label: &str, value: &str) -> String {
    format!("<p><strong>{label}:</strong> {}</p>", clean_text(value))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;
    use crate::domain::types::LeadStatus;

    fn lead(lead_type: LeadType) -> LeadRecord {
        LeadRecord {
            id: Uuid::new_v4(),
            full_name: "Juan <b>Dela Cruz</b>".into(),
            email: "juan@example.com".into(),
            mobile_number: "09171234567".into(),
            business_name: "Juan's Cafe".into(),
            website_or_facebook_link: Some("https://facebook.com/juanscafe".into()),
            industry: "Retail".into(),
            package_interest: "Startup".into(),
            budget_range: "PHP 15,000 - 30,000".into(),
            preferred_contact_method: "Email".into(),
            preferred_contact_value: None,
            message_goals: "More bookings".into(),
            status: LeadStatus::New,
            lead_type,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    struct Recording {
        name: &'static str,
        fail: bool,
        sent: Mutex<Vec<EmailMessage>>,
    }

    impl Recording {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                sent: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl EmailProvider for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Transport {
                    provider: self.name,
                    message: "connection refused".into(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    #[test]
    fn consultation_email_escapes_fields_and_sets_reply_to() {
        let message = lead_email(&lead(LeadType::Consultation), "team@jdigital.local");
        assert_eq!(message.subject, "New Lead: Juan <b>Dela Cruz</b> (Startup)");
        assert!(message.html.contains("&lt;b&gt;"));
        assert!(!message.html.contains("<b>Dela"));
        assert!(message.html.contains(&clean_text("Not provided")));
        assert_eq!(message.reply_to, "juan@example.com");
    }

    #[test]
    fn audit_email_uses_business_in_subject() {
        let message = lead_email(&lead(LeadType::Audit), "team@jdigital.local");
        assert!(message.subject.starts_with("New Audit Request: "));
        assert!(message.subject.ends_with("(Juan's Cafe)"));
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails() {
        let primary = Recording::new("resend", true);
        let fallback = Recording::new("smtp", false);
        let dispatcher = NotificationDispatcher::new(
            Some("team@jdigital.local".into()),
            Some(primary.clone()),
            Some(fallback.clone()),
        );

        let outcome = dispatcher.dispatch(&lead(LeadType::Consultation)).await;
        assert_eq!(outcome, DispatchOutcome::Sent { provider: "smtp" });
        assert_eq!(fallback.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_recipient_skips_providers() {
        let primary = Recording::new("resend", false);
        let dispatcher = NotificationDispatcher::new(Some("  ".into()), Some(primary.clone()), None);

        let outcome = dispatcher.dispatch(&lead(LeadType::Audit)).await;
        assert_eq!(outcome, DispatchOutcome::NoRecipient);
        assert!(primary.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn nothing_configured_is_undelivered() {
        let dispatcher = NotificationDispatcher::new(Some("team@jdigital.local".into()), None, None);
        let outcome = dispatcher.dispatch(&lead(LeadType::Audit)).await;
        assert_eq!(outcome, DispatchOutcome::Undelivered);
    }
}
