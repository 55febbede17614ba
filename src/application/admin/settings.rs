use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{RepoError, SiteSettingsRepo};
use crate::application::validation::{FieldErrors, FormData, settings::validate_site_settings};
use crate::cache::CacheInvalidator;
use crate::domain::entities::SiteSettingsRecord;
use crate::domain::site::fallback_site_settings;
use crate::domain::types::EntityKind;

pub const SETTINGS_UPDATED: &str = "Site settings updated.";

#[derive(Debug, Error)]
pub enum AdminSettingsError {
    #[error("{0}")]
    Validation(FieldErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct AdminSettingsService {
    repo: Arc<dyn SiteSettingsRepo>,
    cache: CacheInvalidator,
}

impl AdminSettingsService {
    pub fn new(repo: Arc<dyn SiteSettingsRepo>, cache: CacheInvalidator) -> Self {
        Self { repo, cache }
    }

    /// Stored settings, or the built-in defaults before the first save.
    pub async fn load(&self) -> Result<SiteSettingsRecord, AdminSettingsError> {
        Ok(self
            .repo
            .load_site_settings()
            .await?
            .unwrap_or_else(fallback_site_settings))
    }

    pub async fn update(&self, form: &FormData) -> Result<SiteSettingsRecord, AdminSettingsError> {
        let payload = validate_site_settings(form).map_err(AdminSettingsError::Validation)?;
        let record = self.repo.upsert_site_settings(&payload).await?;
        self.cache.invalidate(EntityKind::SiteSettings);
        info!(
            target = "jdigital::admin::settings",
            brand = %record.brand_name,
            "site settings updated"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::application::validation::SiteSettingsPayload;

    #[derive(Default)]
    struct MemorySettings {
        row: Mutex<Option<SiteSettingsRecord>>,
    }

    #[async_trait]
    impl SiteSettingsRepo for MemorySettings {
        async fn load_site_settings(&self) -> Result<Option<SiteSettingsRecord>, RepoError> {
            Ok(self.row.lock().unwrap().clone())
        }

        async fn upsert_site_settings(
            &self,
            settings: &SiteSettingsPayload,
        ) -> Result<SiteSettingsRecord, RepoError> {
            let mut record = fallback_site_settings();
            record.brand_name = settings.brand_name.clone();
            record.hero_headline = settings.hero_headline.clone();
            record.testimonials_enabled = settings.testimonials_enabled;
            record.updated_at = OffsetDateTime::now_utc();
            *self.row.lock().unwrap() = Some(record.clone());
            Ok(record)
        }
    }

    #[tokio::test]
    async fn load_falls_back_before_first_save() {
        let service =
            AdminSettingsService::new(Arc::new(MemorySettings::default()), CacheInvalidator::detached());
        let settings = service.load().await.unwrap();
        assert_eq!(settings.brand_name, fallback_site_settings().brand_name);
    }

    #[tokio::test]
    async fn invalid_settings_leave_row_untouched() {
        let repo = Arc::new(MemorySettings::default());
        let service = AdminSettingsService::new(repo.clone(), CacheInvalidator::detached());
        let err = service
            .update(&FormData::new().with("brandName", "J"))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminSettingsError::Validation(_)));
        assert!(repo.row.lock().unwrap().is_none());
    }
}
