//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::content::ContentRecord;
use crate::application::pagination::PageRequest;
use crate::application::validation::{NewLead, SiteSettingsPayload};
use crate::domain::entities::{
    FaqRecord, LeadRecord, MediaAssetRecord, PortfolioProjectRecord, PricingPackageRecord,
    ProcessStepRecord, ServiceRecord, SiteSettingsRecord, TestimonialRecord, UserRecord,
};
use crate::domain::types::LeadStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub search: Option<String>,
    /// Restrict to rows flagged active or published, for collections that have the flag.
    pub visible_only: bool,
}

/// Storage for one admin-managed collection.
#[async_trait]
pub trait ContentRepo<R: ContentRecord>: Send + Sync {
    async fn list(&self, filter: &ContentFilter, page: PageRequest) -> Result<Vec<R>, RepoError>;

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError>;

    async fn find(&self, id: Uuid) -> Result<Option<R>, RepoError>;

    /// Insert when `id` is `None`, otherwise update the existing row.
    async fn save(&self, id: Option<Uuid>, payload: R::Payload) -> Result<R, RepoError>;

    /// Returns `false` when no row carried the id.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[async_trait]
pub trait SiteSettingsRepo: Send + Sync {
    async fn load_site_settings(&self) -> Result<Option<SiteSettingsRecord>, RepoError>;

    async fn upsert_site_settings(
        &self,
        settings: &SiteSettingsPayload,
    ) -> Result<SiteSettingsRecord, RepoError>;
}

#[derive(Debug, Clone, Default)]
pub struct LeadQueryFilter {
    pub search: Option<String>,
    pub status: Option<LeadStatus>,
}

#[async_trait]
pub trait LeadsRepo: Send + Sync {
    async fn create_lead(&self, lead: &NewLead) -> Result<LeadRecord, RepoError>;

    async fn list_leads(
        &self,
        filter: &LeadQueryFilter,
        page: PageRequest,
    ) -> Result<Vec<LeadRecord>, RepoError>;

    async fn count_leads(&self, filter: &LeadQueryFilter) -> Result<u64, RepoError>;

    async fn find_lead(&self, id: Uuid) -> Result<Option<LeadRecord>, RepoError>;

    async fn update_lead_status(&self, id: Uuid, status: LeadStatus) -> Result<bool, RepoError>;

    /// Every lead, newest first.
    async fn list_all_leads(&self) -> Result<Vec<LeadRecord>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewMediaAsset {
    pub file_name: String,
    pub bucket: String,
    pub storage_path: String,
    pub public_url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<Uuid>,
}

#[async_trait]
pub trait MediaRepo: Send + Sync {
    async fn create_media(&self, asset: NewMediaAsset) -> Result<MediaAssetRecord, RepoError>;

    async fn list_media(&self, page: PageRequest) -> Result<Vec<MediaAssetRecord>, RepoError>;

    async fn count_media(&self) -> Result<u64, RepoError>;

    async fn find_media(&self, id: Uuid) -> Result<Option<MediaAssetRecord>, RepoError>;

    async fn delete_media(&self, id: Uuid) -> Result<bool, RepoError>;
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;

    async fn create_user(&self, user: NewUser) -> Result<UserRecord, RepoError>;

    async fn list_users(&self) -> Result<Vec<UserRecord>, RepoError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str)
    -> Result<bool, RepoError>;

    async fn delete_user(&self, id: Uuid) -> Result<bool, RepoError>;
}

/// How much of a public collection a page needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Take {
    #[default]
    Skip,
    All,
    Limit(u32),
}

impl Take {
    pub fn wanted(self) -> bool {
        !matches!(self, Take::Skip)
    }

    pub fn limit(self) -> Option<i64> {
        match self {
            Take::Limit(limit) => Some(i64::from(limit)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PublicContentQuery {
    pub services: Take,
    pub portfolio: Take,
    pub process_steps: Take,
    pub pricing_packages: Take,
    pub faqs: Take,
    pub testimonials: Take,
}

/// Everything one public page renders, read in a single transaction.
#[derive(Debug, Clone, Serialize)]
pub struct PublicContent {
    pub settings: Option<SiteSettingsRecord>,
    pub services: Vec<ServiceRecord>,
    pub portfolio: Vec<PortfolioProjectRecord>,
    pub process_steps: Vec<ProcessStepRecord>,
    pub pricing_packages: Vec<PricingPackageRecord>,
    pub faqs: Vec<FaqRecord>,
    pub testimonials: Vec<TestimonialRecord>,
}

#[derive(Debug, Clone)]
pub struct SitemapProject {
    pub slug: String,
    pub updated_at: OffsetDateTime,
}

#[async_trait]
pub trait PublicContentRepo: Send + Sync {
    async fn load_public_content(
        &self,
        query: PublicContentQuery,
    ) -> Result<PublicContent, RepoError>;

    async fn find_portfolio_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PortfolioProjectRecord>, RepoError>;

    async fn list_sitemap_projects(&self) -> Result<Vec<SitemapProject>, RepoError>;

    async fn ping(&self) -> Result<(), RepoError>;
}
