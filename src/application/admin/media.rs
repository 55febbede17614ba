use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::admin::{FormId, form_id};
use crate::application::pagination::{PageRequest, Paginated};
use crate::application::repos::{MediaRepo, NewMediaAsset, RepoError};
use crate::application::validation::FormData;
use crate::cache::CacheInvalidator;
use crate::domain::entities::MediaAssetRecord;
use crate::domain::types::EntityKind;

pub const UPLOADED: &str = "File uploaded.";
pub const DELETED: &str = "Media deleted.";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Missing env vars: {}.", .0.join(", "))]
    NotConfigured(Vec<&'static str>),
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to reach file storage: {0}")]
    Transport(String),
}

/// Object storage holding uploaded files.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    fn bucket(&self) -> &str;

    /// Stores the object and returns its public URL.
    async fn put(&self, path: &str, body: Bytes, content_type: &str) -> Result<String, StorageError>;

    async fn remove(&self, path: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Please choose a file.")]
    NoFile,
    #[error("File exceeds the {limit} byte upload limit.")]
    TooLarge { limit: u64 },
    #[error("Missing media ID.")]
    MissingId,
    #[error("Media not found.")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub uploaded_by: Option<Uuid>,
}

#[derive(Clone)]
pub struct AdminMediaService {
    repo: Arc<dyn MediaRepo>,
    storage: Arc<dyn MediaStorage>,
    cache: CacheInvalidator,
    upload_limit: u64,
}

impl AdminMediaService {
    pub fn new(
        repo: Arc<dyn MediaRepo>,
        storage: Arc<dyn MediaStorage>,
        cache: CacheInvalidator,
        upload_limit: u64,
    ) -> Self {
        Self {
            repo,
            storage,
            cache,
            upload_limit,
        }
    }

    pub fn upload_limit(&self) -> u64 {
        self.upload_limit
    }

    pub async fn list(&self, page: PageRequest) -> Result<Paginated<MediaAssetRecord>, MediaError> {
        let total = self.repo.count_media().await?;
        let items = self.repo.list_media(page).await?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn upload(
        &self,
        request: UploadRequest,
        now: OffsetDateTime,
    ) -> Result<MediaAssetRecord, MediaError> {
        if request.file_name.trim().is_empty() || request.body.is_empty() {
            return Err(MediaError::NoFile);
        }
        let size = request.body.len() as u64;
        if size > self.upload_limit {
            return Err(MediaError::TooLarge {
                limit: self.upload_limit,
            });
        }

        let path = storage_path(&request.file_name, now);
        let mime_type = request
            .content_type
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let public_url = self.storage.put(&path, request.body, &mime_type).await?;
        let record = self
            .repo
            .create_media(NewMediaAsset {
                file_name: request.file_name,
                bucket: self.storage.bucket().to_string(),
                storage_path: path,
                public_url,
                mime_type,
                size_bytes: i64::try_from(size).unwrap_or(i64::MAX),
                uploaded_by: request.uploaded_by,
            })
            .await?;
        self.cache.invalidate(EntityKind::MediaAsset);

        info!(
            target = "jdigital::admin::media",
            media_id = %record.id,
            path = %record.storage_path,
            size_bytes = record.size_bytes,
            "file uploaded"
        );
        Ok(record)
    }

    /// Removes the stored object, then the row. A storage failure is logged
    /// and does not keep the row alive.
    pub async fn delete(&self, form: &FormData) -> Result<String, MediaError> {
        let id = match form_id(form.get("id")) {
            FormId::Missing => return Err(MediaError::MissingId),
            FormId::Malformed => return Err(MediaError::NotFound),
            FormId::Present(id) => id,
        };
        let media = self.repo.find_media(id).await?.ok_or(MediaError::NotFound)?;

        if let Err(err) = self.storage.remove(&media.storage_path).await {
            warn!(
                target = "jdigital::admin::media",
                media_id = %media.id,
                path = %media.storage_path,
                error = %err,
                "failed to remove stored object"
            );
        }

        if !self.repo.delete_media(id).await? {
            return Err(MediaError::NotFound);
        }
        self.cache.invalidate(EntityKind::MediaAsset);
        info!(
            target = "jdigital::admin::media",
            media_id = %id,
            "media deleted"
        );
        Ok(DELETED.to_string())
    }
}

/// Replaces anything outside `[a-zA-Z0-9.-]` with `-` and lowercases.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' {
                ch.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}

pub fn storage_path(file_name: &str, now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    format!("uploads/{millis}-{}", sanitize_file_name(file_name))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct MemoryMedia {
        rows: Mutex<Vec<MediaAssetRecord>>,
    }

    #[async_trait]
    impl MediaRepo for MemoryMedia {
        async fn create_media(&self, asset: NewMediaAsset) -> Result<MediaAssetRecord, RepoError> {
            let record = MediaAssetRecord {
                id: Uuid::new_v4(),
                file_name: asset.file_name,
                bucket: asset.bucket,
                storage_path: asset.storage_path,
                public_url: asset.public_url,
                mime_type: asset.mime_type,
                size_bytes: asset.size_bytes,
                uploaded_by: asset.uploaded_by,
                created_at: OffsetDateTime::now_utc(),
            };
            self.rows.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn list_media(&self, _page: PageRequest) -> Result<Vec<MediaAssetRecord>, RepoError> {
            Ok(self.rows.lock().unwrap().clone())
        }

        async fn count_media(&self) -> Result<u64, RepoError> {
            Ok(self.rows.lock().unwrap().len() as u64)
        }

        async fn find_media(&self, id: Uuid) -> Result<Option<MediaAssetRecord>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().find(|row| row.id == id).cloned())
        }

        async fn delete_media(&self, id: Uuid) -> Result<bool, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            Ok(rows.len() != before)
        }
    }

    struct FlakyStorage {
        fail_remove: bool,
        stored: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl MediaStorage for FlakyStorage {
        fn bucket(&self) -> &str {
            "media"
        }

        async fn put(&self, path: &str, _body: Bytes, _content_type: &str) -> Result<String, StorageError> {
            self.stored.lock().unwrap().push(path.to_string());
            Ok(format!("https://cdn.test/media/{path}"))
        }

        async fn remove(&self, _path: &str) -> Result<(), StorageError> {
            if self.fail_remove {
                Err(StorageError::Transport("connection reset".into()))
            } else {
                Ok(())
            }
        }
    }

    fn service(fail_remove: bool) -> (AdminMediaService, Arc<MemoryMedia>, Arc<FlakyStorage>) {
        let repo = Arc::new(MemoryMedia::default());
        let storage = Arc::new(FlakyStorage {
            fail_remove,
            stored: Mutex::new(Vec::new()),
        });
        let service = AdminMediaService::new(
            repo.clone(),
            storage.clone(),
            CacheInvalidator::detached(),
            1024,
        );
        (service, repo, storage)
    }

    fn upload(name: &str, body: &'static [u8]) -> UploadRequest {
        UploadRequest {
            file_name: name.to_string(),
            content_type: Some("image/png".into()),
            body: Bytes::from_static(body),
            uploaded_by: None,
        }
    }

    #[test]
    fn file_names_are_sanitised_and_lowercased() {
        assert_eq!(sanitize_file_name("My Logo (Final).PNG"), "my-logo--final-.png");
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(
            storage_path("Hero Banner.jpg", now),
            "uploads/1700000000000-hero-banner.jpg"
        );
    }

    #[tokio::test]
    async fn upload_stores_object_then_row() {
        let (service, repo, storage) = service(false);
        let record = service
            .upload(upload("Team Photo.png", b"png"), OffsetDateTime::now_utc())
            .await
            .unwrap();
        assert!(record.public_url.starts_with("https://cdn.test/media/uploads/"));
        assert_eq!(record.bucket, "media");
        assert_eq!(storage.stored.lock().unwrap().len(), 1);
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_or_oversized_files_are_rejected() {
        let (service, repo, _) = service(false);
        let err = service
            .upload(upload("empty.png", b""), OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please choose a file.");

        let big: &'static [u8] = Box::leak(vec![0u8; 2048].into_boxed_slice());
        let err = service
            .upload(upload("big.png", big), OffsetDateTime::now_utc())
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::TooLarge { limit: 1024 }));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_does_not_block_delete() {
        let (service, repo, _) = service(true);
        let record = service
            .upload(upload("a.png", b"png"), OffsetDateTime::now_utc())
            .await
            .unwrap();
        let form = FormData::new().with("id", record.id.to_string());
        assert_eq!(service.delete(&form).await.unwrap(), DELETED);
        assert!(repo.rows.lock().unwrap().is_empty());

        let err = service.delete(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "Media not found.");
    }

    #[test]
    fn missing_configuration_lists_keys() {
        let err = StorageError::NotConfigured(vec!["storage.supabase_url", "storage.service_role_key"]);
        assert_eq!(
            err.to_string(),
            "Missing env vars: storage.supabase_url, storage.service_role_key."
        );
    }
}
