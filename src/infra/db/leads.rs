use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{LeadQueryFilter, LeadsRepo, RepoError};
use crate::application::validation::NewLead;
use crate::domain::entities::LeadRecord;
use crate::domain::types::{LeadStatus, LeadType};

use super::{PostgresRepositories, map_sqlx_error};

const LEAD_COLUMNS: &str = "id, full_name, email, mobile_number, business_name, \
     website_or_facebook_link, industry, package_interest, budget_range, \
     preferred_contact_method, preferred_contact_value, message_goals, status, lead_type, \
     created_at";

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: Uuid,
    full_name: String,
    email: String,
    mobile_number: String,
    business_name: String,
    website_or_facebook_link: Option<String>,
    industry: String,
    package_interest: String,
    budget_range: String,
    preferred_contact_method: String,
    preferred_contact_value: Option<String>,
    message_goals: String,
    status: LeadStatus,
    lead_type: LeadType,
    created_at: OffsetDateTime,
}

impl From<LeadRow> for LeadRecord {
    fn from(row: LeadRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            mobile_number: row.mobile_number,
            business_name: row.business_name,
            website_or_facebook_link: row.website_or_facebook_link,
            industry: row.industry,
            package_interest: row.package_interest,
            budget_range: row.budget_range,
            preferred_contact_method: row.preferred_contact_method,
            preferred_contact_value: row.preferred_contact_value,
            message_goals: row.message_goals,
            status: row.status,
            lead_type: row.lead_type,
            created_at: row.created_at,
        }
    }
}

impl PostgresRepositories {
    fn apply_lead_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeadQueryFilter) {
        if let Some(status) = filter.status {
            qb.push(" AND status = ");
            qb.push_bind(status);
        }

        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            let pattern = format!("%{search}%");
            qb.push(" AND (full_name ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR email ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR business_name ILIKE ");
            qb.push_bind(pattern);
            qb.push(")");
        }
    }
}

#[async_trait]
impl LeadsRepo for PostgresRepositories {
    async fn create_lead(&self, lead: &NewLead) -> Result<LeadRecord, RepoError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "INSERT INTO leads (id, full_name, email, mobile_number, business_name, \
             website_or_facebook_link, industry, package_interest, budget_range, \
             preferred_contact_method, preferred_contact_value, message_goals, status, lead_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {LEAD_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&lead.full_name)
        .bind(&lead.email)
        .bind(&lead.mobile_number)
        .bind(&lead.business_name)
        .bind(&lead.website_or_facebook_link)
        .bind(&lead.industry)
        .bind(&lead.package_interest)
        .bind(&lead.budget_range)
        .bind(&lead.preferred_contact_method)
        .bind(&lead.preferred_contact_value)
        .bind(&lead.message_goals)
        .bind(LeadStatus::New)
        .bind(lead.lead_type)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(LeadRecord::from(row))
    }

    async fn list_leads(
        &self,
        filter: &LeadQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<LeadRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!("SELECT {LEAD_COLUMNS} FROM leads WHERE TRUE"));
        Self::apply_lead_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");
        Self::push_page(&mut qb, page);

        let rows = qb
            .build_query_as::<LeadRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(LeadRecord::from).collect())
    }

    async fn count_leads(&self, filter: &LeadQueryFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM leads WHERE TRUE");
        Self::apply_lead_filter(&mut qb, filter);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find_lead(&self, id: Uuid) -> Result<Option<LeadRecord>, RepoError> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(LeadRecord::from))
    }

    async fn update_lead_status(&self, id: Uuid, status: LeadStatus) -> Result<bool, RepoError> {
        let result = sqlx::query("UPDATE leads SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all_leads(&self) -> Result<Vec<LeadRecord>, RepoError> {
        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(LeadRecord::from).collect())
    }
}
