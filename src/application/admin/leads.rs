use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;

use crate::application::admin::{FormId, form_id};
use crate::application::export::{CsvExport, LeadExportService};
use crate::application::pagination::{PageRequest, Paginated};
use crate::application::repos::{LeadQueryFilter, LeadsRepo, RepoError};
use crate::application::validation::FormData;
use crate::cache::CacheInvalidator;
use crate::domain::entities::LeadRecord;
use crate::domain::types::{EntityKind, LeadStatus};

pub const LEADS_PAGE_SIZE: u32 = 12;
pub const STATUS_UPDATED: &str = "Lead status updated.";

#[derive(Debug, Error)]
pub enum AdminLeadError {
    #[error("Missing lead ID or status.")]
    MissingField,
    #[error("Unknown lead status.")]
    InvalidStatus,
    #[error("Lead not found.")]
    NotFound,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AdminLeadService {
    repo: Arc<dyn LeadsRepo>,
    export: LeadExportService,
    cache: CacheInvalidator,
}

impl AdminLeadService {
    pub fn new(repo: Arc<dyn LeadsRepo>, cache: CacheInvalidator) -> Self {
        Self {
            export: LeadExportService::new(repo.clone()),
            repo,
            cache,
        }
    }

    /// Builds the inbox filter from query parameters. `ALL` and unknown
    /// statuses select every status.
    pub fn filter(search: Option<&str>, status: Option<&str>) -> LeadQueryFilter {
        LeadQueryFilter {
            search: search
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
            status: status.and_then(|value| LeadStatus::try_from(value).ok()),
        }
    }

    pub async fn list(
        &self,
        filter: &LeadQueryFilter,
        page: Option<u32>,
    ) -> Result<Paginated<LeadRecord>, AdminLeadError> {
        let page = PageRequest::new(page, LEADS_PAGE_SIZE);
        let total = self.repo.count_leads(filter).await?;
        let items = self.repo.list_leads(filter, page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn update_status(&self, form: &FormData) -> Result<String, AdminLeadError> {
        let raw_status = form.non_blank("status").ok_or(AdminLeadError::MissingField)?;
        let id = match form_id(form.get("id")) {
            FormId::Missing => return Err(AdminLeadError::MissingField),
            FormId::Malformed => return Err(AdminLeadError::NotFound),
            FormId::Present(id) => id,
        };
        let status = LeadStatus::try_from(raw_status).map_err(|_| AdminLeadError::InvalidStatus)?;

        if !self.repo.update_lead_status(id, status).await? {
            return Err(AdminLeadError::NotFound);
        }
        self.cache.invalidate(EntityKind::Lead);
        info!(
            target = "jdigital::admin::leads",
            lead_id = %id,
            status = status.as_str(),
            "lead status updated"
        );
        Ok(STATUS_UPDATED.to_string())
    }

    pub async fn export(&self, today: OffsetDateTime) -> Result<CsvExport, AdminLeadError> {
        let export = self.export.export(today).await?;
        info!(
            target = "jdigital::admin::leads",
            filename = %export.filename,
            "lead export generated"
        );
        Ok(export)
    }
}
