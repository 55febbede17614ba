use async_trait::async_trait;
use sqlx::{PgConnection, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::TestimonialPayload;
use crate::domain::entities::TestimonialRecord;

use super::{PostgresRepositories, map_sqlx_error};

const SEARCH_COLUMNS: &[&str] = &["name", "company", "quote"];

#[derive(sqlx::FromRow)]
struct TestimonialRow {
    id: Uuid,
    name: String,
    role: String,
    company: String,
    quote: String,
    avatar_url: Option<String>,
    position: i32,
    is_published: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<TestimonialRow> for TestimonialRecord {
    fn from(row: TestimonialRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: row.role,
            company: row.company,
            quote: row.quote,
            avatar_url: row.avatar_url,
            position: row.position,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn fetch_testimonials(
    conn: &mut PgConnection,
    filter: &ContentFilter,
    page: PageRequest,
) -> Result<Vec<TestimonialRecord>, RepoError> {
    let mut qb = QueryBuilder::new(
        "SELECT id, name, role, company, quote, avatar_url, position, is_published, \
         created_at, updated_at FROM testimonials WHERE TRUE",
    );
    PostgresRepositories::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_published"));
    qb.push(" ORDER BY position ASC, created_at ASC");
    PostgresRepositories::push_page(&mut qb, page);

    let rows = qb
        .build_query_as::<TestimonialRow>()
        .fetch_all(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(TestimonialRecord::from).collect())
}

#[async_trait]
impl ContentRepo<TestimonialRecord> for PostgresRepositories {
    async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Vec<TestimonialRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_testimonials(&mut conn, filter, page).await
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM testimonials WHERE TRUE");
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_published"));
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find(&self, id: Uuid) -> Result<Option<TestimonialRecord>, RepoError> {
        let row = sqlx::query_as::<_, TestimonialRow>(
            "SELECT id, name, role, company, quote, avatar_url, position, is_published, \
             created_at, updated_at FROM testimonials WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(TestimonialRecord::from))
    }

    async fn save(
        &self,
        id: Option<Uuid>,
        payload: TestimonialPayload,
    ) -> Result<TestimonialRecord, RepoError> {
        let sql = if id.is_some() {
            "UPDATE testimonials SET name = $2, role = $3, company = $4, quote = $5, \
             avatar_url = $6, position = $7, is_published = $8, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, name, role, company, quote, avatar_url, position, is_published, \
             created_at, updated_at"
        } else {
            "INSERT INTO testimonials \
             (id, name, role, company, quote, avatar_url, position, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, name, role, company, quote, avatar_url, position, is_published, \
             created_at, updated_at"
        };
        let row = sqlx::query_as::<_, TestimonialRow>(sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(payload.name)
            .bind(payload.role)
            .bind(payload.company)
            .bind(payload.quote)
            .bind(payload.avatar_url)
            .bind(payload.position)
            .bind(payload.is_published)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.map(TestimonialRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
