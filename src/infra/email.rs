//! Outbound email providers for lead notifications.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use reqwest::{Client, Url};
use serde::Serialize;

use crate::application::notify::{EmailMessage, EmailProvider, NotificationDispatcher, NotifyError};
use crate::config::{NotificationSettings, SmtpSettings};

use super::error::InfraError;

const RESEND_ENDPOINT: &str = "https://api.resend.com/emails";
const SMTPS_PORT: u16 = 465;

/// Resend HTTP API.
#[derive(Clone)]
pub struct ResendProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
    from: String,
}

#[derive(Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    reply_to: &'a str,
}

impl ResendProvider {
    pub fn new(client: Client, api_key: String, from: String) -> Result<Self, InfraError> {
        let endpoint = Url::parse(RESEND_ENDPOINT)
            .map_err(|err| InfraError::configuration(format!("invalid resend endpoint: {err}")))?;
        Ok(Self::with_endpoint(client, endpoint, api_key, from))
    }

    pub fn with_endpoint(client: Client, endpoint: Url, api_key: String, from: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl EmailProvider for ResendProvider {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let payload = ResendPayload {
            from: &self.from,
            to: [&message.to],
            subject: &message.subject,
            html: &message.html,
            reply_to: &message.reply_to,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| NotifyError::Transport {
                provider: self.name(),
                message: err.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            provider: self.name(),
            message: format!("{status}: {body}"),
        })
    }
}

/// SMTP relay. Port 465 uses implicit TLS, every other port STARTTLS.
#[derive(Clone)]
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpProvider {
    pub fn new(settings: &SmtpSettings) -> Result<Self, InfraError> {
        let relay = if settings.port == SMTPS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
        };
        let builder = relay
            .map_err(|err| InfraError::configuration(format!("invalid smtp host: {err}")))?;

        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.user.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: settings.from.clone(),
        })
    }

    fn build_message(&self, message: &EmailMessage) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.parse().map_err(invalid_message)?)
            .to(message.to.parse().map_err(invalid_message)?)
            .reply_to(message.reply_to.parse().map_err(invalid_message)?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(invalid_message)
    }
}

fn invalid_message(err: impl std::fmt::Display) -> NotifyError {
    NotifyError::InvalidMessage(err.to_string())
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    fn name(&self) -> &'static str {
        "smtp"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let email = self.build_message(message)?;
        self.transport
            .send(email)
            .await
            .map(|_| ())
            .map_err(|err| NotifyError::Transport {
                provider: self.name(),
                message: err.to_string(),
            })
    }
}

/// Wires the configured providers into a dispatcher. Either provider may be absent.
pub fn build_dispatcher(
    settings: &NotificationSettings,
    client: Client,
) -> Result<NotificationDispatcher, InfraError> {
    let primary: Option<Arc<dyn EmailProvider>> = match settings.resend_api_key.as_ref() {
        Some(key) => Some(Arc::new(ResendProvider::new(
            client,
            key.clone(),
            settings.resend_from.clone(),
        )?)),
        None => None,
    };
    let fallback: Option<Arc<dyn EmailProvider>> = match settings.smtp.as_ref() {
        Some(smtp) => Some(Arc::new(SmtpProvider::new(smtp)?)),
        None => None,
    };

    Ok(NotificationDispatcher::new(
        settings.recipient.clone(),
        primary,
        fallback,
    ))
}
