use async_trait::async_trait;
use sqlx::{PgConnection, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::ServicePayload;
use crate::domain::entities::ServiceRecord;

use super::{PostgresRepositories, map_sqlx_error};

const SELECT_SERVICES: &str = "SELECT id, title, slug, short_description, description, icon_key, \
     position, is_active, created_at, updated_at FROM services WHERE TRUE";

const INSERT_SERVICE: &str = "INSERT INTO services \
     (id, title, slug, short_description, description, icon_key, position, is_active) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
     RETURNING id, title, slug, short_description, description, icon_key, \
     position, is_active, created_at, updated_at";

const UPDATE_SERVICE: &str = "UPDATE services SET title = $2, slug = $3, short_description = $4, \
     description = $5, icon_key = $6, position = $7, is_active = $8, updated_at = now() \
     WHERE id = $1 \
     RETURNING id, title, slug, short_description, description, icon_key, \
     position, is_active, created_at, updated_at";

const SEARCH_COLUMNS: &[&str] = &["title", "slug"];

#[derive(sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    title: String,
    slug: String,
    short_description: String,
    description: String,
    icon_key: Option<String>,
    position: i32,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<ServiceRow> for ServiceRecord {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            short_description: row.short_description,
            description: row.description,
            icon_key: row.icon_key,
            position: row.position,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub(super) async fn fetch_services(
    conn: &mut PgConnection,
    filter: &ContentFilter,
    page: PageRequest,
) -> Result<Vec<ServiceRecord>, RepoError> {
    let mut qb = QueryBuilder::new(SELECT_SERVICES);
    PostgresRepositories::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_active"));
    qb.push(" ORDER BY position ASC, created_at ASC");
    PostgresRepositories::push_page(&mut qb, page);

    let rows = qb
        .build_query_as::<ServiceRow>()
        .fetch_all(conn)
        .await
        .map_err(map_sqlx_error)?;
    Ok(rows.into_iter().map(ServiceRecord::from).collect())
}

#[async_trait]
impl ContentRepo<ServiceRecord> for PostgresRepositories {
    async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Vec<ServiceRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_services(&mut conn, filter, page).await
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM services WHERE TRUE");
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_active"));
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ServiceRecord>, RepoError> {
        let row = sqlx::query_as::<_, ServiceRow>(
            "SELECT id, title, slug, short_description, description, icon_key, \
             position, is_active, created_at, updated_at FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(ServiceRecord::from))
    }

    async fn save(
        &self,
        id: Option<Uuid>,
        payload: ServicePayload,
    ) -> Result<ServiceRecord, RepoError> {
        let sql = if id.is_some() {
            UPDATE_SERVICE
        } else {
            INSERT_SERVICE
        };
        let row = sqlx::query_as::<_, ServiceRow>(sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(payload.title)
            .bind(payload.slug)
            .bind(payload.short_description)
            .bind(payload.description)
            .bind(payload.icon_key)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.map(ServiceRecord::from).ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
