//! Postgres-backed repository implementations.

mod categories;
mod faqs;
mod leads;
mod media;
mod portfolio;
mod pricing;
mod process;
mod public;
mod rate_limits;
mod services;
mod settings;
mod testimonials;
mod users;
mod util;

pub use util::map_sqlx_error;

use std::sync::Arc;

use sqlx::{
    Postgres, QueryBuilder, Transaction,
    postgres::{PgPool, PgPoolOptions},
    query,
};

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, RepoError};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
    }

    pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        query("SELECT 1").execute(self.pool()).await.map(|_| ())
    }

    /// Appends the admin search and visibility conditions to a `WHERE TRUE` query.
    fn apply_content_filter(
        qb: &mut QueryBuilder<'_, Postgres>,
        filter: &ContentFilter,
        search_columns: &[&str],
        visible_column: Option<&str>,
    ) {
        if filter.visible_only
            && let Some(column) = visible_column
        {
            qb.push(" AND ");
            qb.push(column);
        }

        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            && !search_columns.is_empty()
        {
            let pattern = format!("%{search}%");
            qb.push(" AND (");
            for (index, column) in search_columns.iter().enumerate() {
                if index > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column);
                qb.push(" ILIKE ");
                qb.push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }

    fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: PageRequest) {
        qb.push(" LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());
    }

    fn convert_count(value: i64) -> Result<u64, RepoError> {
        value
            .try_into()
            .map_err(|_| RepoError::from_persistence("count exceeds supported range"))
    }
}
