use async_trait::async_trait;
use sqlx::{PgConnection, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::FaqPayload;
use crate::domain::entities::FaqRecord;

use super::{PostgresRepositories, map_sqlx_error};

const SEARCH_COLUMNS: &[&str] = &["question", "answer"];

#[derive(sqlx::FromRow)]
struct FaqRow {
    id: Uuid,
    question: String,
    answer: String,
    position: i32,
    is_published: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<FaqRow> for FaqRecord {
    fn from(row: FaqRow) -> Self {
        Self {
            id: row.id,
            question: row.question,
            answer: row.answer,
            position: row.position,
            is_published: row.is_published,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn fetch_faqs(
    conn: &mut PgConnection,
    filter: &ContentFilter,
    page: PageRequest,
) -> Result<Vec<FaqRecord>, RepoError> {
    let mut qb = QueryBuilder::new(
        "SELECT id, question, answer, position, is_published, created_at, updated_at \
         FROM faqs WHERE TRUE",
    );
    PostgresRepositories::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_published"));
    qb.push(" ORDER BY position ASC, created_at ASC");
    PostgresRepositories::push_page(&mut qb, page);

    let rows = qb
        .build_query_as::<FaqRow>()
        .fetch_all(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(FaqRecord::from).collect())
}

#[async_trait]
impl ContentRepo<FaqRecord> for PostgresRepositories {
    async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Vec<FaqRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_faqs(&mut conn, filter, page).await
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM faqs WHERE TRUE");
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_published"));
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find(&self, id: Uuid) -> Result<Option<FaqRecord>, RepoError> {
        let row = sqlx::query_as::<_, FaqRow>(
            "SELECT id, question, answer, position, is_published, created_at, updated_at \
             FROM faqs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(FaqRecord::from))
    }

    async fn save(&self, id: Option<Uuid>, payload: FaqPayload) -> Result<FaqRecord, RepoError> {
        let sql = if id.is_some() {
            "UPDATE faqs SET question = $2, answer = $3, position = $4, is_published = $5, \
             updated_at = now() WHERE id = $1 \
             RETURNING id, question, answer, position, is_published, created_at, updated_at"
        } else {
            "INSERT INTO faqs (id, question, answer, position, is_published) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, question, answer, position, is_published, created_at, updated_at"
        };
        let row = sqlx::query_as::<_, FaqRow>(sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(payload.question)
            .bind(payload.answer)
            .bind(payload.position)
            .bind(payload.is_published)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.map(FaqRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
