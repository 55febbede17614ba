//! Sitemap generation for the marketing pages and portfolio detail pages.

use std::sync::Arc;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

use crate::application::repos::PublicContentRepo;

pub const DEFAULT_SITE_URL: &str = "https://jdigital-solutions.vercel.app";

const STATIC_PAGES: [&str; 7] = [
    "",
    "/about",
    "/services",
    "/portfolio",
    "/process",
    "/pricing",
    "/contact",
];

/// Rendered sitemap. `partial` means portfolio entries were left out.
#[derive(Debug, Clone)]
pub struct Sitemap {
    pub xml: String,
    pub partial: bool,
}

#[derive(Clone)]
pub struct SitemapService {
    repo: Arc<dyn PublicContentRepo>,
    base_url: String,
}

impl SitemapService {
    pub fn new(repo: Arc<dyn PublicContentRepo>, base_url: &str) -> Self {
        Self {
            repo,
            base_url: normalize_site_url(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Portfolio entries are omitted when the store cannot be read.
    pub async fn render(&self, now: OffsetDateTime) -> Sitemap {
        let mut entries = Vec::with_capacity(STATIC_PAGES.len());
        for page in STATIC_PAGES {
            let (changefreq, priority) = if page.is_empty() {
                ("weekly", "1.0")
            } else {
                ("monthly", "0.8")
            };
            entries.push(sitemap_entry(
                &format!("{}{page}", self.base_url),
                now,
                changefreq,
                priority,
            ));
        }

        let partial = match self.repo.list_sitemap_projects().await {
            Ok(projects) => {
                for project in projects {
                    entries.push(sitemap_entry(
                        &format!("{}/portfolio/{}", self.base_url, project.slug),
                        project.updated_at,
                        "monthly",
                        "0.6",
                    ));
                }
                false
            }
            Err(err) => {
                warn!(
                    target = "jdigital::application::sitemap",
                    error = %err,
                    "portfolio entries unavailable for sitemap"
                );
                true
            }
        };

        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
        );
        for entry in entries {
            xml.push_str(&entry);
        }
        xml.push_str("</urlset>\n");
        Sitemap { xml, partial }
    }
}

/// Absolute origin without a trailing slash; bare hosts get `https://`.
pub fn normalize_site_url(raw: &str) -> String {
    let raw = raw.trim();
    let raw = if raw.is_empty() { DEFAULT_SITE_URL } else { raw };
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

fn sitemap_entry(loc: &str, lastmod: OffsetDateTime, changefreq: &str, priority: &str) -> String {
    let lastmod = lastmod.format(&Rfc3339).unwrap_or_default();
    if lastmod.is_empty() {
        format!(
            "  <url><loc>{loc}</loc><changefreq>{changefreq}</changefreq><priority>{priority}</priority></url>\n"
        )
    } else {
        format!(
            "  <url><loc>{loc}</loc><lastmod>{lastmod}</lastmod><changefreq>{changefreq}</changefreq><priority>{priority}</priority></url>\n"
        )
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use time::macros::datetime;

    use super::*;
    use crate::application::repos::{
        PublicContent, PublicContentQuery, RepoError, SitemapProject,
    };
    use crate::domain::entities::PortfolioProjectRecord;

    struct Projects(Result<Vec<SitemapProject>, ()>);

    #[async_trait]
    impl PublicContentRepo for Projects {
        async fn load_public_content(
            &self,
            _query: PublicContentQuery,
        ) -> Result<PublicContent, RepoError> {
            Err(RepoError::Timeout)
        }

        async fn find_portfolio_by_slug(
            &self,
            _slug: &str,
        ) -> Result<Option<PortfolioProjectRecord>, RepoError> {
            Ok(None)
        }

        async fn list_sitemap_projects(&self) -> Result<Vec<SitemapProject>, RepoError> {
            self.0.clone().map_err(|_| RepoError::Timeout)
        }

        async fn ping(&self) -> Result<(), RepoError> {
            Ok(())
        }
    }

    #[test]
    fn site_url_gets_scheme_and_loses_trailing_slash() {
        assert_eq!(normalize_site_url("jdigital.ph/"), "https://jdigital.ph");
        assert_eq!(normalize_site_url("http://localhost:3000//"), "http://localhost:3000");
        assert_eq!(normalize_site_url(""), DEFAULT_SITE_URL);
    }

    #[tokio::test]
    async fn lists_static_pages_and_projects() {
        let repo = Projects(Ok(vec![SitemapProject {
            slug: "metrobuild-prime".into(),
            updated_at: datetime!(2026-02-01 00:00 UTC),
        }]));
        let sitemap = SitemapService::new(Arc::new(repo), "https://jdigital.ph")
            .render(datetime!(2026-03-01 00:00 UTC))
            .await;
        assert!(!sitemap.partial);
        let xml = sitemap.xml;

        assert!(xml.contains("<loc>https://jdigital.ph</loc>"));
        assert!(xml.contains("<loc>https://jdigital.ph/contact</loc>"));
        assert!(xml.contains(
            "<loc>https://jdigital.ph/portfolio/metrobuild-prime</loc><lastmod>2026-02-01T00:00:00Z</lastmod>"
        ));
        assert_eq!(xml.matches("<url>").count(), 8);
    }

    #[tokio::test]
    async fn store_failure_keeps_static_pages() {
        let sitemap = SitemapService::new(Arc::new(Projects(Err(()))), "https://jdigital.ph")
            .render(datetime!(2026-03-01 00:00 UTC))
            .await;
        assert!(sitemap.partial);
        assert_eq!(sitemap.xml.matches("<url>").count(), 7);
    }
}
