use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::{GalleryImage, PortfolioPayload};
use crate::domain::entities::{PortfolioProjectRecord, ProjectImageRecord};
use crate::domain::types::ProjectStatus;

use super::{PostgresRepositories, map_sqlx_error};

const PROJECT_COLUMNS: &str = "id, title, slug, industry, short_summary, tags, cover_image, \
     services_provided, live_link, status, position, created_at, updated_at";
const SEARCH_COLUMNS: &[&str] = &["title", "slug", "industry"];

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    title: String,
    slug: String,
    industry: String,
    short_summary: String,
    tags: Vec<String>,
    cover_image: String,
    services_provided: Vec<String>,
    live_link: Option<String>,
    status: ProjectStatus,
    position: i32,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl ProjectRow {
    fn into_record(self, gallery: Vec<ProjectImageRecord>) -> PortfolioProjectRecord {
        PortfolioProjectRecord {
            id: self.id,
            title: self.title,
            slug: self.slug,
            industry: self.industry,
            short_summary: self.short_summary,
            tags: self.tags,
            cover_image: self.cover_image,
            services_provided: self.services_provided,
            live_link: self.live_link,
            status: self.status,
            position: self.position,
            gallery,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    project_id: Uuid,
    url: String,
    alt: Option<String>,
    position: i32,
}

impl From<ImageRow> for ProjectImageRecord {
    fn from(row: ImageRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            url: row.url,
            alt: row.alt,
            position: row.position,
        }
    }
}

async fn load_galleries(
    conn: &mut PgConnection,
    project_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, Vec<ProjectImageRecord>>, RepoError> {
    if project_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = sqlx::query_as::<_, ImageRow>(
        "SELECT id, project_id, url, alt, position FROM project_images \
         WHERE project_id = ANY($1) ORDER BY project_id, position ASC, created_at ASC",
    )
    .bind(project_ids)
    .fetch_all(conn)
    .await
    .map_err(map_sqlx_error)?;

    let mut galleries: HashMap<Uuid, Vec<ProjectImageRecord>> = HashMap::new();
    for row in rows {
        galleries
            .entry(row.project_id)
            .or_default()
            .push(ProjectImageRecord::from(row));
    }
    Ok(galleries)
}

async fn attach_galleries(
    conn: &mut PgConnection,
    rows: Vec<ProjectRow>,
) -> Result<Vec<PortfolioProjectRecord>, RepoError> {
    let ids = rows.iter().map(|row| row.id).collect();
    let mut galleries = load_galleries(conn, ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let gallery = galleries.remove(&row.id).unwrap_or_default();
            row.into_record(gallery)
        })
        .collect())
}

pub(super) async fn fetch_projects(
    conn: &mut PgConnection,
    filter: &ContentFilter,
    page: PageRequest,
) -> Result<Vec<PortfolioProjectRecord>, RepoError> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {PROJECT_COLUMNS} FROM portfolio_projects WHERE TRUE"
    ));
    PostgresRepositories::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, None);
    qb.push(" ORDER BY position ASC, created_at DESC");
    PostgresRepositories::push_page(&mut qb, page);

    let rows = qb
        .build_query_as::<ProjectRow>()
        .fetch_all(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    attach_galleries(conn, rows).await
}

pub(super) enum ProjectKey<'a> {
    Id(Uuid),
    Slug(&'a str),
}

pub(super) async fn fetch_project(
    conn: &mut PgConnection,
    key: ProjectKey<'_>,
) -> Result<Option<PortfolioProjectRecord>, RepoError> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {PROJECT_COLUMNS} FROM portfolio_projects WHERE "
    ));
    match key {
        ProjectKey::Id(id) => {
            qb.push("id = ");
            qb.push_bind(id);
        }
        ProjectKey::Slug(slug) => {
            qb.push("slug = ");
            qb.push_bind(slug.to_string());
        }
    }

    let row = qb
        .build_query_as::<ProjectRow>()
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    match row {
        Some(row) => Ok(attach_galleries(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn replace_gallery(
    conn: &mut PgConnection,
    project_id: Uuid,
    images: Vec<GalleryImage>,
) -> Result<(), RepoError> {
    sqlx::query("DELETE FROM project_images WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

    for (position, image) in (1_i32..).zip(images) {
        sqlx::query(
            "INSERT INTO project_images (id, project_id, url, alt, position) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(Uuid::new_v4())
        .bind(project_id)
        .bind(image.url)
        .bind(image.alt)
        .bind(position)
        .execute(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;
    }
    Ok(())
}

#[async_trait]
impl ContentRepo<PortfolioProjectRecord> for PostgresRepositories {
    async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Vec<PortfolioProjectRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_projects(&mut conn, filter, page).await
    }

    async fn count(&self, filter: &ContentFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM portfolio_projects WHERE TRUE");
        Self::apply_content_filter(&mut qb, filter, SEARCH_COLUMNS, None);
        let count: i64 = qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find(&self, id: Uuid) -> Result<Option<PortfolioProjectRecord>, RepoError> {
        let mut conn = self.pool().acquire().await.map_err(map_sqlx_error)?;
        fetch_project(&mut conn, ProjectKey::Id(id)).await
    }

    /// The project row and its gallery are written in one transaction. A
    /// payload without a gallery leaves the stored images untouched.
    async fn save(
        &self,
        id: Option<Uuid>,
        payload: PortfolioPayload,
    ) -> Result<PortfolioProjectRecord, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;

        let sql = if id.is_some() {
            "UPDATE portfolio_projects SET title = $2, slug = $3, industry = $4, \
             short_summary = $5, tags = $6, cover_image = $7, services_provided = $8, \
             live_link = $9, status = $10, position = $11, updated_at = now() WHERE id = $1 \
             RETURNING id, title, slug, industry, short_summary, tags, cover_image, \
             services_provided, live_link, status, position, created_at, updated_at"
        } else {
            "INSERT INTO portfolio_projects (id, title, slug, industry, short_summary, tags, \
             cover_image, services_provided, live_link, status, position) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING id, title, slug, industry, short_summary, tags, cover_image, \
             services_provided, live_link, status, position, created_at, updated_at"
        };
        let row = sqlx::query_as::<_, ProjectRow>(sql)
            .bind(id.unwrap_or_else(Uuid::new_v4))
            .bind(payload.title)
            .bind(payload.slug)
            .bind(payload.industry)
            .bind(payload.short_summary)
            .bind(payload.tags)
            .bind(payload.cover_image)
            .bind(payload.services_provided)
            .bind(payload.live_link)
            .bind(payload.status)
            .bind(payload.position)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?
            .ok_or(RepoError::NotFound)?;

        if let Some(images) = payload.gallery {
            replace_gallery(&mut *tx, row.id, images).await?;
        }

        let mut saved = attach_galleries(&mut *tx, vec![row]).await?;
        tx.commit().await.map_err(map_sqlx_error)?;
        saved.pop().ok_or(RepoError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM portfolio_projects WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
