use async_trait::async_trait;
use sqlx::{PgConnection, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::PricingPackagePayload;
use crate::domain::entities::PricingPackageRecord;

use super::{PostgresRepositories, map_sqlx_error};

const SEARCH_COLUMNS: &[&str] = &["name", "slug"];

#[derive(sqlx::FromRow)]
struct PricingRow {
    id: Uuid,
    name: String,
    slug: String,
    price: i32,
    delivery: String,
    includes: Vec<String>,
    freebies: Vec<String>,
    note: Option<String>,
    is_popular: bool,
    position: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<PricingRow> for PricingPackageRecord {
    fn from(row: PricingRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            price: row.price,
            delivery: row.delivery,
            includes: row.includes,
            freebies: row.freebies,
            note: row.note,
            is_popular: row.is_popular,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn fetch_pricing_packages(
    conn: &mut PgConnection,
    filter: &ContentFilter,
    page: PageRequest,
) -> Result<Vec<PricingPackageRecord>, RepoError> {
    let mut qb = QueryBuilder::new(
        "SELECT id, name, slug, price, delivery, includes, freebies, note, is_popular, position, \
         created_at, updated_at FROM pricing_packages WHERE TRUE",
    );
    PostgresRepositories::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, None);
    qb.push(" ORDER BY position ASC, created_at ASC");
    PostgresRepositories::push_page(&mut qb, page);

    let rows = qb
        .build_query_as::<PricingRow>()
        .fetch_all(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(PricingPackageRecord::from).collect())
}

#[async_trait]
impl ContentRepo<PricingPackageRecord> for PostgresRepositories {
    async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Vec<PricingPackageRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_pricing_packages(&mut conn, filter, page).await
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM pricing_packages WHERE TRUE");
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, None);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find(&self, id: Uuid) -> Result<Option<PricingPackageRecord>, RepoError> {
        let row = sqlx::query_as::<_, PricingRow>(
            "SELECT id, name, slug, price, delivery, includes, freebies, note, is_popular, \
             position, created_at, updated_at FROM pricing_packages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(PricingPackageRecord::from))
    }

    /// Saving a popular package clears the flag on every other package in the
    /// same transaction.
    async fn save(
        &self,
        id: Option<Uuid>,
        payload: PricingPackagePayload,
    ) -> Result<PricingPackageRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let sql = if id.is_some() {
            "UPDATE pricing_packages SET name = $2, slug = $3, price = $4, delivery = $5, \
             includes = $6, freebies = $7, note = $8, is_popular = $9, position = $10, \
             updated_at = now() WHERE id = $1 \
             RETURNING id, name, slug, price, delivery, includes, freebies, note, is_popular, \
             position, created_at, updated_at"
        } else {
            "INSERT INTO pricing_packages \
             (id, name, slug, price, delivery, includes, freebies, note, is_popular, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING id, name, slug, price, delivery, includes, freebies, note, is_popular, \
             position, created_at, updated_at"
        };
        let row = sqlx::query_as::<_, PricingRow>(sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(payload.name)
            .bind(payload.slug)
            .bind(payload.price)
            .bind(payload.delivery)
            .bind(payload.includes)
            .bind(payload.freebies)
            .bind(payload.note)
            .bind(payload.is_popular)
            .bind(payload.position)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        if row.is_popular {
            sqlx::query(
                "UPDATE pricing_packages SET is_popular = FALSE, updated_at = now() \
                 WHERE id <> $1 AND is_popular",
            )
            .bind(row.id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(PricingPackageRecord::from(row))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM pricing_packages WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
