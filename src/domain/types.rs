//! Shared domain enumerations aligned with persisted database enums.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Closed,
    Lost,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 5] = [
        LeadStatus::New,
        LeadStatus::Contacted,
        LeadStatus::Qualified,
        LeadStatus::Closed,
        LeadStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::New => "NEW",
            LeadStatus::Contacted => "CONTACTED",
            LeadStatus::Qualified => "QUALIFIED",
            LeadStatus::Closed => "CLOSED",
            LeadStatus::Lost => "LOST",
        }
    }
}

impl TryFrom<&str> for LeadStatus {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| DomainError::UnknownLeadStatus(value.to_string()))
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "lead_type", rename_all = "snake_case")]
pub enum LeadType {
    Consultation,
    Audit,
}

impl LeadType {
    pub fn as_str(self) -> &'static str {
        match self {
            LeadType::Consultation => "CONSULTATION",
            LeadType::Audit => "AUDIT",
        }
    }
}

impl fmt::Display for LeadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a portfolio entry is a concept piece or shipped client work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
pub enum ProjectStatus {
    Demo,
    Client,
}

impl ProjectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Demo => "DEMO",
            ProjectStatus::Client => "CLIENT",
        }
    }
}

impl TryFrom<&str> for ProjectStatus {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEMO" => Ok(ProjectStatus::Demo),
            "CLIENT" => Ok(ProjectStatus::Client),
            _ => Err(DomainError::UnknownProjectStatus(value.to_string())),
        }
    }
}

/// Every record kind the admin panel can mutate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    SiteSettings,
    Service,
    PortfolioProject,
    ProjectCategory,
    ProcessStep,
    PricingPackage,
    Faq,
    Testimonial,
    Lead,
    MediaAsset,
    User,
}

impl EntityKind {
    /// Capitalised name used at the start of admin result messages.
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::SiteSettings => "Site settings",
            EntityKind::Service => "Service",
            EntityKind::PortfolioProject => "Project",
            EntityKind::ProjectCategory => "Project category",
            EntityKind::ProcessStep => "Process step",
            EntityKind::PricingPackage => "Pricing package",
            EntityKind::Faq => "FAQ",
            EntityKind::Testimonial => "Testimonial",
            EntityKind::Lead => "Lead",
            EntityKind::MediaAsset => "Media",
            EntityKind::User => "Admin user",
        }
    }

    /// Name used mid-sentence ("Missing service ID.").
    pub fn noun(self) -> &'static str {
        match self {
            EntityKind::SiteSettings => "site settings",
            EntityKind::Service => "service",
            EntityKind::PortfolioProject => "project",
            EntityKind::ProjectCategory => "category",
            EntityKind::ProcessStep => "process step",
            EntityKind::PricingPackage => "package",
            EntityKind::Faq => "FAQ",
            EntityKind::Testimonial => "testimonial",
            EntityKind::Lead => "lead",
            EntityKind::MediaAsset => "media",
            EntityKind::User => "user",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::SiteSettings => "site_settings",
            EntityKind::Service => "service",
            EntityKind::PortfolioProject => "portfolio_project",
            EntityKind::ProjectCategory => "project_category",
            EntityKind::ProcessStep => "process_step",
            EntityKind::PricingPackage => "pricing_package",
            EntityKind::Faq => "faq",
            EntityKind::Testimonial => "testimonial",
            EntityKind::Lead => "lead",
            EntityKind::MediaAsset => "media_asset",
            EntityKind::User => "user",
        }
    }
}
