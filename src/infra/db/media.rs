use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::application::pagination::PageRequest;
use crate::application::repos::{MediaRepo, NewMediaAsset, RepoError};
use crate::domain::entities::MediaAssetRecord;

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct MediaRow {
    id: Uuid,
    file_name: String,
    bucket: String,
    storage_path: String,
    public_url: String,
    mime_type: String,
    size_bytes: i64,
    uploaded_by: Option<Uuid>,
    created_at: OffsetDateTime,
}

impl From<MediaRow> for MediaAssetRecord {
    fn from(row: MediaRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name,
            bucket: row.bucket,
            storage_path: row.storage_path,
            public_url: row.public_url,
            mime_type: row.mime_type,
            size_bytes: row.size_bytes,
            uploaded_by: row.uploaded_by,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl MediaRepo for PostgresRepositories {
    async fn create_media(&self, asset: NewMediaAsset) -> Result<MediaAssetRecord, RepoError> {
        let row = sqlx::query_as::<_, MediaRow>(
            "INSERT INTO media_assets \
             (id, file_name, bucket, storage_path, public_url, mime_type, size_bytes, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id, file_name, bucket, storage_path, public_url, mime_type, size_bytes, \
             uploaded_by, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(asset.file_name)
        .bind(asset.bucket)
        .bind(asset.storage_path)
        .bind(asset.public_url)
        .bind(asset.mime_type)
        .bind(asset.size_bytes)
        .bind(asset.uploaded_by)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(MediaAssetRecord::from(row))
    }

    async fn list_media(&self, page: PageRequest) -> Result<Vec<MediaAssetRecord>, RepoError> {
        let rows = sqlx::query_as::<_, MediaRow>(
            "SELECT id, file_name, bucket, storage_path, public_url, mime_type, size_bytes, \
             uploaded_by, created_at FROM media_assets \
             ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(MediaAssetRecord::from).collect())
    }

    async fn count_media(&self) -> Result<u64, RepoError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media_assets")
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Self::convert_count(count)
    }

    async fn find_media(&self, id: Uuid) -> Result<Option<MediaAssetRecord>, RepoError> {
        let row = sqlx::query_as::<_, MediaRow>(
            "SELECT id, file_name, bucket, storage_path, public_url, mime_type, size_bytes, \
             uploaded_by, created_at FROM media_assets WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(MediaAssetRecord::from))
    }

    async fn delete_media(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM media_assets WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }
}
