//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::types::{LeadStatus, LeadType, ProjectStatus};

/// Singleton row holding brand copy, contact channels and SEO defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteSettingsRecord {
    pub brand_name: String,
    pub hero_headline: String,
    pub hero_subheadline: String,
    pub primary_cta_label: String,
    pub primary_cta_link: String,
    pub secondary_cta_label: String,
    pub secondary_cta_link: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub office_address: Option<String>,
    pub whatsapp_link: Option<String>,
    pub messenger_link: Option<String>,
    pub message_button_label: String,
    pub message_button_link: Option<String>,
    pub calendar_booking_link: Option<String>,
    pub facebook_url: Option<String>,
    pub instagram_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub seo_default_title: String,
    pub seo_default_description: String,
    pub highlight_package_slug: String,
    pub testimonials_enabled: bool,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub icon_key: Option<String>,
    pub position: i32,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioProjectRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub industry: String,
    pub short_summary: String,
    pub tags: Vec<String>,
    pub cover_image: String,
    pub services_provided: Vec<String>,
    pub live_link: Option<String>,
    pub status: ProjectStatus,
    pub position: i32,
    pub gallery: Vec<ProjectImageRecord>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectImageRecord {
    pub id: Uuid,
    pub project_id: Uuid,
    pub url: String,
    pub alt: Option<String>,
    pub position: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectCategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub position: i32,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessStepRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub deliverables: Vec<String>,
    pub timeline: String,
    pub position: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingPackageRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub price: i32,
    pub delivery: String,
    pub includes: Vec<String>,
    pub freebies: Vec<String>,
    pub note: Option<String>,
    pub is_popular: bool,
    pub position: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqRecord {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub position: i32,
    pub is_published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestimonialRecord {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub company: String,
    pub quote: String,
    pub avatar_url: Option<String>,
    pub position: i32,
    pub is_published: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A prospect's inquiry. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadRecord {
    pub id: Uuid,
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
    pub status: LeadStatus,
    pub lead_type: LeadType,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaAssetRecord {
    pub id: Uuid,
    pub file_name: String,
    pub bucket: String,
    pub storage_path: String,
    pub public_url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub uploaded_by: Option<Uuid>,
    pub created_at: OffsetDateTime,
}

/// Admin account. The password hash never leaves the application layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: OffsetDateTime,
}
