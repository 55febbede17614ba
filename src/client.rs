//! Client for the public lead forms.
//!
//! [`LeadFormClient`] remembers the last successful submission and refuses
//! to resend identical content for a short while, so a double click never
//! reaches the network. The server-side rate limiter stays authoritative.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

use crate::application::leads::SubmissionResult;
use crate::application::validation::{AuditSubmission, ConsultationSubmission};

pub const DUPLICATE_WINDOW: Duration = Duration::from_secs(30);
pub const DUPLICATE_MESSAGE: &str =
    "You already submitted this request. Please wait while we review it.";

/// One of the two public forms, ready to send.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LeadForm {
    Consultation(ConsultationSubmission),
    Audit(AuditSubmission),
}

impl LeadForm {
    /// Stable digest of the normalized field values.
    pub fn fingerprint(&self) -> String {
        let fields = match self {
            LeadForm::Consultation(form) => form.fingerprint_fields(),
            LeadForm::Audit(form) => form.fingerprint_fields(),
        };

        let mut hasher = Sha256::new();
        for (name, value) in fields {
            let normalized = if name == "mobileNumber" {
                value.trim().to_string()
            } else {
                value.trim().to_lowercase()
            };
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(normalized.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    fn path(&self) -> &'static str {
        match self {
            LeadForm::Consultation(_) => "api/leads",
            LeadForm::Audit(_) => "api/leads/audit",
        }
    }
}

/// Memory of the last successful submission.
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new(DUPLICATE_WINDOW)
    }
}

impl SubmissionGuard {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// `true` when `fingerprint` matches the last success inside the window.
    pub fn check(&self, fingerprint: &str, now: Instant) -> bool {
        match &self.last {
            Some((previous, at)) => {
                previous == fingerprint && now.saturating_duration_since(*at) < self.window
            }
            None => false,
        }
    }

    pub fn record(&mut self, fingerprint: String, now: Instant) {
        self.last = Some((fingerprint, now));
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid lead endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("lead submission request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait LeadTransport: Send + Sync {
    async fn submit(&self, form: &LeadForm) -> Result<SubmissionResult, ClientError>;
}

/// Posts forms as JSON to a running site.
#[derive(Debug, Clone)]
pub struct HttpLeadTransport {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpLeadTransport {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { http, base_url })
    }
}

#[async_trait]
impl LeadTransport for HttpLeadTransport {
    async fn submit(&self, form: &LeadForm) -> Result<SubmissionResult, ClientError> {
        let url = self.base_url.join(form.path())?;
        let response = self.http.post(url).json(form).send().await?;
        // Validation and throttling failures still carry a result body.
        Ok(response.json::<SubmissionResult>().await?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent(SubmissionResult),
    /// Suppressed locally; informational rather than an error.
    Duplicate { message: &'static str },
}

pub struct LeadFormClient<T: LeadTransport> {
    transport: T,
    guard: Mutex<SubmissionGuard>,
}

impl<T: LeadTransport> LeadFormClient<T> {
    pub fn new(transport: T) -> Self {
        Self::with_guard(transport, SubmissionGuard::default())
    }

    pub fn with_guard(transport: T, guard: SubmissionGuard) -> Self {
        Self {
            transport,
            guard: Mutex::new(guard),
        }
    }

    pub async fn submit(&self, form: LeadForm) -> Result<SubmitOutcome, ClientError> {
        self.submit_at(form, Instant::now()).await
    }

    pub async fn submit_at(&self, form: LeadForm, now: Instant) -> Result<SubmitOutcome, ClientError> {
        let fingerprint = form.fingerprint();
        let duplicate = self
            .guard
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .check(&fingerprint, now);
        if duplicate {
            return Ok(SubmitOutcome::Duplicate {
                message: DUPLICATE_MESSAGE,
            });
        }

        let result = self.transport.submit(&form).await?;
        if result.success {
            self.guard
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .record(fingerprint, now);
        }
        Ok(SubmitOutcome::Sent(result))
    }
}
