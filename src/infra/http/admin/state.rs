use std::sync::Arc;

use crate::application::admin::{
    AdminContentService, AdminLeadService, AdminMediaService, AdminSettingsService,
    AdminUserService, AuthService,
};
use crate::domain::entities::{
    FaqRecord, PortfolioProjectRecord, PricingPackageRecord, ProcessStepRecord,
    ProjectCategoryRecord, ServiceRecord, TestimonialRecord,
};

#[derive(Clone)]
pub struct AdminState {
    pub auth: Arc<AuthService>,
    pub services: Arc<AdminContentService<ServiceRecord>>,
    pub portfolio: Arc<AdminContentService<PortfolioProjectRecord>>,
    pub categories: Arc<AdminContentService<ProjectCategoryRecord>>,
    pub process: Arc<AdminContentService<ProcessStepRecord>>,
    pub pricing: Arc<AdminContentService<PricingPackageRecord>>,
    pub faqs: Arc<AdminContentService<FaqRecord>>,
    pub testimonials: Arc<AdminContentService<TestimonialRecord>>,
    pub settings: Arc<AdminSettingsService>,
    pub leads: Arc<AdminLeadService>,
    pub media: Arc<AdminMediaService>,
    pub users: Arc<AdminUserService>,
    /// Marks the session cookie `Secure`. Off for plain-HTTP local setups.
    pub secure_cookies: bool,
}
