//! Read path for the public marketing pages.
//!
//! Every page read goes through one aggregate query. When the store is
//! unreachable the pages still render from the built-in settings with
//! empty collections.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::application::repos::{PublicContent, PublicContentQuery, PublicContentRepo, Take};
use crate::domain::entities::{
    FaqRecord, PortfolioProjectRecord, PricingPackageRecord, ProcessStepRecord, ServiceRecord,
    SiteSettingsRecord, TestimonialRecord,
};
use crate::domain::industry::{PORTFOLIO_FILTERS, matches_filter, normalize_industry};
use crate::domain::site::fallback_site_settings;

pub const HOME_PORTFOLIO_LIMIT: u32 = 30;
pub const HOME_FAQ_LIMIT: u32 = 6;
pub const PRICING_FAQ_LIMIT: u32 = 5;
pub const CONTACT_FAQ_LIMIT: u32 = 6;

/// Settings plus whichever collections a page asked for.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPage {
    pub settings: SiteSettingsRecord,
    pub services: Vec<ServiceRecord>,
    pub portfolio: Vec<PortfolioProjectRecord>,
    pub process_steps: Vec<ProcessStepRecord>,
    pub pricing_packages: Vec<PricingPackageRecord>,
    pub faqs: Vec<FaqRecord>,
    pub testimonials: Vec<TestimonialRecord>,
    /// Set when the store could not be read and the page was built from the fallback.
    #[serde(skip)]
    pub degraded: bool,
}

impl PublicPage {
    pub fn fallback() -> Self {
        let mut page = Self::from_content(PublicContent {
            settings: None,
            services: Vec::new(),
            portfolio: Vec::new(),
            process_steps: Vec::new(),
            pricing_packages: Vec::new(),
            faqs: Vec::new(),
            testimonials: Vec::new(),
        });
        page.degraded = true;
        page
    }

    fn from_content(content: PublicContent) -> Self {
        Self {
            settings: content.settings.unwrap_or_else(fallback_site_settings),
            services: content.services,
            portfolio: content.portfolio,
            process_steps: content.process_steps,
            pricing_packages: content.pricing_packages,
            faqs: content.faqs,
            testimonials: content.testimonials,
            degraded: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioPage {
    #[serde(flatten)]
    pub page: PublicPage,
    pub filters: [&'static str; 6],
    pub active_filter: String,
}

#[derive(Clone)]
pub struct PublicSiteService {
    repo: Arc<dyn PublicContentRepo>,
}

impl PublicSiteService {
    pub fn new(repo: Arc<dyn PublicContentRepo>) -> Self {
        Self { repo }
    }

    pub async fn home(&self) -> PublicPage {
        self.load(
            "home",
            PublicContentQuery {
                services: Take::All,
                portfolio: Take::Limit(HOME_PORTFOLIO_LIMIT),
                process_steps: Take::All,
                pricing_packages: Take::All,
                faqs: Take::Limit(HOME_FAQ_LIMIT),
                testimonials: Take::All,
            },
        )
        .await
    }

    pub async fn services(&self) -> PublicPage {
        self.load(
            "services",
            PublicContentQuery {
                services: Take::All,
                ..Default::default()
            },
        )
        .await
    }

    /// All projects, narrowed to one industry filter unless it is absent or "All".
    pub async fn portfolio(&self, industry: Option<&str>) -> PortfolioPage {
        let mut page = self
            .load(
                "portfolio",
                PublicContentQuery {
                    portfolio: Take::All,
                    ..Default::default()
                },
            )
            .await;

        let active_filter = industry
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .and_then(|value| {
                let normalized = normalize_industry(value);
                PORTFOLIO_FILTERS
                    .iter()
                    .find(|filter| filter.eq_ignore_ascii_case(&normalized))
                    .copied()
            })
            .unwrap_or(PORTFOLIO_FILTERS[0]);

        page.portfolio
            .retain(|project| matches_filter(&project.industry, active_filter));

        PortfolioPage {
            page,
            filters: PORTFOLIO_FILTERS,
            active_filter: active_filter.to_string(),
        }
    }

    /// A lookup failure renders as not found rather than an error page.
    pub async fn portfolio_detail(&self, slug: &str) -> Option<PortfolioProjectRecord> {
        match self.repo.find_portfolio_by_slug(slug).await {
            Ok(project) => project,
            Err(err) => {
                warn!(
                    target = "jdigital::application::public",
                    slug,
                    error = %err,
                    "portfolio detail lookup failed"
                );
                None
            }
        }
    }

    pub async fn process(&self) -> PublicPage {
        self.load(
            "process",
            PublicContentQuery {
                process_steps: Take::All,
                ..Default::default()
            },
        )
        .await
    }

    pub async fn pricing(&self) -> PublicPage {
        self.load(
            "pricing",
            PublicContentQuery {
                pricing_packages: Take::All,
                faqs: Take::Limit(PRICING_FAQ_LIMIT),
                ..Default::default()
            },
        )
        .await
    }

    /// Testimonials are withheld while the settings flag is off.
    pub async fn about(&self) -> PublicPage {
        let mut page = self
            .load(
                "about",
                PublicContentQuery {
                    testimonials: Take::All,
                    ..Default::default()
                },
            )
            .await;
        if !page.settings.testimonials_enabled {
            page.testimonials.clear();
        }
        page
    }

    pub async fn contact(&self) -> PublicPage {
        self.load(
            "contact",
            PublicContentQuery {
                pricing_packages: Take::All,
                faqs: Take::Limit(CONTACT_FAQ_LIMIT),
                ..Default::default()
            },
        )
        .await
    }

    async fn load(&self, page: &'static str, query: PublicContentQuery) -> PublicPage {
        match self.repo.load_public_content(query).await {
            Ok(content) => PublicPage::from_content(content),
            Err(err) => {
                warn!(
                    target = "jdigital::application::public",
                    page,
                    error = %err,
                    "public content unavailable; serving fallback"
                );
                PublicPage::fallback()
            }
        }
    }
}
