use async_trait::async_trait;
use sqlx::{PgConnection, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::ProcessStepPayload;
use crate::domain::entities::ProcessStepRecord;

use super::{PostgresRepositories, map_sqlx_error};

const SEARCH_COLUMNS: &[&str] = &["title", "description"];

#[derive(sqlx::FromRow)]
struct ProcessStepRow {
    id: Uuid,
    title: String,
    description: String,
    deliverables: Vec<String>,
    timeline: String,
    position: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ProcessStepRow> for ProcessStepRecord {
    fn from(row: ProcessStepRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            deliverables: row.deliverables,
            timeline: row.timeline,
            position: row.position,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn fetch_process_steps(
    conn: &mut PgConnection,
    filter: &ContentFilter,
    page: PageRequest,
) -> Result<Vec<ProcessStepRecord>, RepoError> {
    let mut qb = QueryBuilder::new(
        "SELECT id, title, description, deliverables, timeline, position, created_at, updated_at \
         FROM process_steps WHERE TRUE",
    );
    PostgresRepositories::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, None);
    qb.push(" ORDER BY position ASC, created_at ASC");
    PostgresRepositories::push_page(&mut qb, page);

    let rows = qb
        .build_query_as::<ProcessStepRow>()
        .fetch_all(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(ProcessStepRecord::from).collect())
}

#[async_trait]
impl ContentRepo<ProcessStepRecord> for PostgresRepositories {
    async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Vec<ProcessStepRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_process_steps(&mut conn, filter, page).await
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM process_steps WHERE TRUE");
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, None);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ProcessStepRecord>, RepoError> {
        let row = sqlx::query_as::<_, ProcessStepRow>(
            "SELECT id, title, description, deliverables, timeline, position, created_at, updated_at \
             FROM process_steps WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(ProcessStepRecord::from))
    }

    async fn save(
        &self,
        id: Option<Uuid>,
        payload: ProcessStepPayload,
    ) -> Result<ProcessStepRecord, RepoError> {
        let sql = if id.is_some() {
            "UPDATE process_steps SET title = $2, description = $3, deliverables = $4, \
             timeline = $5, position = $6, updated_at = now() WHERE id = $1 \
             RETURNING id, title, description, deliverables, timeline, position, created_at, updated_at"
        } else {
            "INSERT INTO process_steps (id, title, description, deliverables, timeline, position) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, title, description, deliverables, timeline, position, created_at, updated_at"
        };
        let row = sqlx::query_as::<_, ProcessStepRow>(sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(payload.title)
            .bind(payload.description)
            .bind(payload.deliverables)
            .bind(payload.timeline)
            .bind(payload.position)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.map(ProcessStepRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM process_steps WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
