//! Public lead intake: validate, throttle, store, notify.

use std::collections::BTreeMap;
use std::sync::Arc;

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::notify::LeadNotifier;
use crate::application::rate_limit::{
    RATE_LIMITED_MESSAGE, RateLimitPolicy, RateLimiter, SubmissionPolicies, audit_key,
};
use crate::application::repos::{LeadsRepo, RepoError};
use crate::application::validation::leads::{validate_audit, validate_consultation};
use crate::application::validation::{AuditSubmission, ConsultationSubmission, FieldErrors, NewLead};
use crate::domain::entities::LeadRecord;

pub const INCOMPLETE_MESSAGE: &str = "Please complete all required fields.";
pub const CONSULTATION_RECEIVED: &str = "We received your inquiry. We will respond within 24 hours.";
pub const AUDIT_RECEIVED: &str = "Audit request received. We will reply within 24 hours.";
pub const UNREADABLE_MESSAGE: &str = "We could not read your submission. Please check the form.";
pub const UNAVAILABLE_MESSAGE: &str =
    "We could not save your request right now. Please try again shortly.";

/// JSON body returned to the visitor's browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_id: Option<Uuid>,
}

impl SubmissionResult {
    pub fn accepted(message: impl Into<String>, lead_id: Uuid) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
            lead_id: Some(lead_id),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            lead_id: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LeadIntakeError {
    #[error("submission failed validation")]
    Validation(FieldErrors),
    #[error("submission rate limit exceeded for `{key}`")]
    RateLimited { key: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl LeadIntakeError {
    pub fn to_result(&self) -> SubmissionResult {
        match self {
            LeadIntakeError::Validation(errors) => SubmissionResult {
                success: false,
                message: INCOMPLETE_MESSAGE.to_string(),
                errors: Some(errors.to_map()),
                lead_id: None,
            },
            LeadIntakeError::RateLimited { .. } => SubmissionResult::rejected(RATE_LIMITED_MESSAGE),
            LeadIntakeError::Repo(_) => SubmissionResult::rejected(UNAVAILABLE_MESSAGE),
        }
    }
}

#[derive(Clone)]
pub struct LeadIntakeService {
    leads: Arc<dyn LeadsRepo>,
    limiter: Arc<dyn RateLimiter>,
    notifier: Arc<dyn LeadNotifier>,
    policies: SubmissionPolicies,
}

impl LeadIntakeService {
    pub fn new(
        leads: Arc<dyn LeadsRepo>,
        limiter: Arc<dyn RateLimiter>,
        notifier: Arc<dyn LeadNotifier>,
        policies: SubmissionPolicies,
    ) -> Self {
        Self {
            leads,
            limiter,
            notifier,
            policies,
        }
    }

    pub async fn submit_consultation(
        &self,
        input: &ConsultationSubmission,
        client_ip: &str,
    ) -> Result<SubmissionResult, LeadIntakeError> {
        let lead = validate_consultation(input).map_err(LeadIntakeError::Validation)?;
        let stored = self
            .admit(&lead, client_ip.to_string(), self.policies.consultation)
            .await?;
        Ok(SubmissionResult::accepted(CONSULTATION_RECEIVED, stored.id))
    }

    pub async fn submit_audit(
        &self,
        input: &AuditSubmission,
        client_ip: &str,
    ) -> Result<SubmissionResult, LeadIntakeError> {
        let lead = validate_audit(input).map_err(LeadIntakeError::Validation)?;
        let stored = self
            .admit(&lead, audit_key(client_ip), self.policies.audit)
            .await?;
        Ok(SubmissionResult::accepted(AUDIT_RECEIVED, stored.id))
    }

    async fn admit(
        &self,
        lead: &NewLead,
        key: String,
        policy: RateLimitPolicy,
    ) -> Result<LeadRecord, LeadIntakeError> {
        let decision = self
            .limiter
            .check(&key, policy.max_requests, policy.window)
            .await;
        if !decision.allowed {
            counter!("jdigital_submissions_rate_limited_total").increment(1);
            warn!(
                target = "jdigital::application::leads",
                key = %key,
                lead_type = %lead.lead_type,
                "lead submission rate limited"
            );
            return Err(LeadIntakeError::RateLimited { key });
        }

        let stored = self.leads.create_lead(lead).await?;
        counter!("jdigital_leads_created_total", "type" => lead.lead_type.as_str()).increment(1);
        info!(
            target = "jdigital::application::leads",
            lead_id = %stored.id,
            lead_type = %stored.lead_type,
            "lead stored"
        );

        self.notifier.notify(&stored).await;
        Ok(stored)
    }
}
