use async_trait::async_trait;
use sqlx::QueryBuilder;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::ProjectCategoryPayload;
use crate::domain::entities::ProjectCategoryRecord;

use super::{PostgresRepositories, map_sqlx_error};

const CATEGORY_COLUMNS: &str = "id, name, slug, position, is_active, created_at, updated_at";
const SEARCH_COLUMNS: &[&str] = &["name", "slug"];

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    slug: String,
    position: i32,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<CategoryRow> for ProjectCategoryRecord {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            position: row.position,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl ContentRepo<ProjectCategoryRecord> for PostgresRepositories {
    async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Vec<ProjectCategoryRecord>, RepoError> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {CATEGORY_COLUMNS} FROM project_categories WHERE TRUE"
        ));
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_active"));
        qb.push(" ORDER BY position ASC, name ASC");
        Self::push_page(&mut qb, page);

        let rows = qb
            .build_query_as::<CategoryRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ProjectCategoryRecord::from).collect())
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM project_categories WHERE TRUE");
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, Some("is_active"));
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ProjectCategoryRecord>, RepoError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug, position, is_active, created_at, updated_at \
             FROM project_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(ProjectCategoryRecord::from))
    }

    async fn save(
        &self,
        id: Option<Uuid>,
        payload: ProjectCategoryPayload,
    ) -> Result<ProjectCategoryRecord, RepoError> {
        let sql = if id.is_some() {
            "UPDATE project_categories SET name = $2, slug = $3, position = $4, \
             is_active = $5, updated_at = now() WHERE id = $1 \
             RETURNING id, name, slug, position, is_active, created_at, updated_at"
        } else {
            "INSERT INTO project_categories (id, name, slug, position, is_active) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, slug, position, is_active, created_at, updated_at"
        };
        let row = sqlx::query_as::<_, CategoryRow>(sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(payload.name)
            .bind(payload.slug)
            .bind(payload.position)
            .bind(payload.is_active)
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        row.map(ProjectCategoryRecord::from)
            .ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM project_categories WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
