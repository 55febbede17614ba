use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::pagination::PageRequest;
use crate::application::repos::{
    ContentFilter, PublicContent, PublicContentQuery, PublicContentRepo, RepoError, SitemapProject,
    Take,
};
use crate::domain::entities::PortfolioProjectRecord;

use super::faqs::fetch_faqs;
use super::portfolio::{ProjectKey, fetch_project, fetch_projects};
use super::pricing::fetch_pricing_packages;
use super::process::fetch_process_steps;
use super::services::fetch_services;
use super::settings::fetch_site_settings;
use super::testimonials::fetch_testimonials;
use super::{PostgresRepositories, map_sqlx_error};

fn take_page(take: Take) -> Option<PageRequest> {
    match take {
        Take::Skip => None,
        Take::All => Some(PageRequest::all()),
        Take::Limit(limit) => Some(PageRequest {
            page: 1,
            page_size: limit,
        }),
    }
}

#[derive(sqlx::FromRow)]
struct SitemapRow {
    slug: String,
    updated_at: OffsetDateTime,
}

#[async_trait]
impl PublicContentRepo for PostgresRepositories {
    /// Reads every requested collection from one repeatable-read snapshot.
    async fn load_public_content(
        &self,
        query: PublicContentQuery,
    ) -> Result<PublicContent, RepoError> {
        let visible = ContentFilter {
            search: None,
            visible_only: true,
        };
        let all = ContentFilter::default();

        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let settings = fetch_site_settings(&mut tx).await?;

        let services = match take_page(query.services) {
            Some(page) => fetch_services(&mut tx, &visible, page).await?,
            None => Vec::new(),
        };
        let portfolio = match take_page(query.portfolio) {
            Some(page) => fetch_projects(&mut tx, &all, page).await?,
            None => Vec::new(),
        };
        let process_steps = match take_page(query.process_steps) {
            Some(page) => fetch_process_steps(&mut tx, &all, page).await?,
            None => Vec::new(),
        };
        let pricing_packages = match take_page(query.pricing_packages) {
            Some(page) => fetch_pricing_packages(&mut tx, &all, page).await?,
            None => Vec::new(),
        };
        let faqs = match take_page(query.faqs) {
            Some(page) => fetch_faqs(&mut tx, &visible, page).await?,
            None => Vec::new(),
        };
        let testimonials = match take_page(query.testimonials) {
            Some(page) => fetch_testimonials(&mut tx, &visible, page).await?,
            None => Vec::new(),
        };

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(PublicContent {
            settings,
            services,
            portfolio,
            process_steps,
            pricing_packages,
            faqs,
            testimonials,
        })
    }

    async fn find_portfolio_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<PortfolioProjectRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_project(&mut conn, ProjectKey::Slug(slug)).await
    }

    async fn list_sitemap_projects(&self) -> Result<Vec<SitemapProject>, RepoError> {
        let rows = sqlx::query_as::<_, SitemapRow>(
            "SELECT slug, updated_at FROM portfolio_projects ORDER BY position ASC, created_at DESC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows
            .into_iter()
            .map(|row| SitemapProject {
                slug: row.slug,
                updated_at: row.updated_at,
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), RepoError> {
        self.health_check().await.map_err(map_sqlx_error)
    }
}
