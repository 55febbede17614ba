use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::admin::{FormId, form_id};
use crate::application::content::ContentRecord;
use crate::application::pagination::{PageRequest, Paginated};
use crate::application::repos::{ContentFilter, ContentRepo, RepoError};
use crate::application::validation::{FieldErrors, FormData};
use crate::cache::CacheInvalidator;
use crate::domain::types::EntityKind;

#[derive(Debug, Error)]
pub enum AdminContentError {
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("Missing {} ID.", .0.noun())]
    MissingId(EntityKind),
    #[error("{} not found.", .0.label())]
    NotFound(EntityKind),
    #[error("Unable to save {}. Name or slug may already exist.", .0.noun())]
    Conflict(EntityKind),
    #[error(transparent)]
    Repo(RepoError),
}

impl AdminContentError {
    fn from_repo(kind: EntityKind, err: RepoError) -> Self {
        match err {
            RepoError::Duplicate { .. } => Self::Conflict(kind),
            RepoError::NotFound => Self::NotFound(kind),
            other => Self::Repo(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentSaved<R> {
    pub record: R,
    pub message: String,
}

/// Create, update, list and delete for one content collection.
pub struct AdminContentService<R: ContentRecord> {
    repo: Arc<dyn ContentRepo<R>>,
    cache: CacheInvalidator,
}

impl<R: ContentRecord> Clone for AdminContentService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<R: ContentRecord> AdminContentService<R> {
    pub fn new(repo: Arc<dyn ContentRepo<R>>, cache: CacheInvalidator) -> Self {
        Self { repo, cache }
    }

    pub fn kind(&self) -> EntityKind {
        R::KIND
    }

    pub async fn list(
        &self,
        filter: &ContentFilter,
        page: PageRequest,
    ) -> Result<Paginated<R>, AdminContentError> {
        let total = self.repo.count(filter).await.map_err(AdminContentError::Repo)?;
        let items = self
            .repo
            .list(filter, page)
            .await
            .map_err(AdminContentError::Repo)?;
        Ok(Paginated::new(items, page, total))
    }

    pub async fn find(&self, id: Uuid) -> Result<R, AdminContentError> {
        self.repo
            .find(id)
            .await
            .map_err(AdminContentError::Repo)?
            .ok_or(AdminContentError::NotFound(R::KIND))
    }

    /// Validates the form and inserts, or updates when it carries an `id`.
    pub async fn save(&self, form: &FormData) -> Result<ContentSaved<R>, AdminContentError> {
        let id = match form_id(form.get("id")) {
            FormId::Missing => None,
            FormId::Present(id) => Some(id),
            FormId::Malformed => return Err(AdminContentError::NotFound(R::KIND)),
        };
        let payload = R::validate(form).map_err(AdminContentError::Validation)?;

        let record = self
            .repo
            .save(id, payload)
            .await
            .map_err(|err| AdminContentError::from_repo(R::KIND, err))?;
        self.cache.invalidate(R::KIND);

        info!(
            target = "jdigital::admin::content",
            entity = R::KIND.as_str(),
            id = %record.id(),
            created = id.is_none(),
            "content saved"
        );
        Ok(ContentSaved {
            record,
            message: format!("{} saved.", R::KIND.label()),
        })
    }

    pub async fn delete(&self, form: &FormData) -> Result<String, AdminContentError> {
        let id = match form_id(form.get("id")) {
            FormId::Missing => return Err(AdminContentError::MissingId(R::KIND)),
            FormId::Malformed => return Err(AdminContentError::NotFound(R::KIND)),
            FormId::Present(id) => id,
        };

        let removed = self
            .repo
            .delete(id)
            .await
            .map_err(|err| AdminContentError::from_repo(R::KIND, err))?;
        if !removed {
            return Err(AdminContentError::NotFound(R::KIND));
        }
        self.cache.invalidate(R::KIND);

        info!(
            target = "jdigital::admin::content",
            entity = R::KIND.as_str(),
            id = %id,
            "content deleted"
        );
        Ok(format!("{} deleted.", R::KIND.label()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use time::OffsetDateTime;

    use super::*;
    use crate::application::validation::FaqPayload;
    use crate::domain::entities::FaqRecord;

    #[derive(Default)]
    struct MemoryFaqs {
        rows: Mutex<Vec<FaqRecord>>,
        fail_with_duplicate: bool,
    }

    #[async_trait]
    impl ContentRepo<FaqRecord> for MemoryFaqs {
        async fn list(
            &self,
            _filter: &ContentFilter,
            page: PageRequest,
        ) -> Result<Vec<FaqRecord>, RepoError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows
                .iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .cloned()
                .collect())
        }

        async fn count(&self, _filter: &ContentFilter) -> Result<u64, RepoError> {
            Ok(self.rows.lock().unwrap().len() as u64)
        }

        async fn find(&self, id: Uuid) -> Result<Option<FaqRecord>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().find(|row| row.id == id).cloned())
        }

        async fn save(&self, id: Option<Uuid>, payload: FaqPayload) -> Result<FaqRecord, RepoError> {
            if self.fail_with_duplicate {
                return Err(RepoError::Duplicate {
                    constraint: "faqs_question_key".into(),
                });
            }
            let mut rows = self.rows.lock().unwrap();
            let now = OffsetDateTime::now_utc();
            let record = FaqRecord {
                id: id.unwrap_or_else(Uuid::new_v4),
                question: payload.question,
                answer: payload.answer,
                position: payload.position,
                is_published: payload.is_published,
                created_at: now,
                updated_at: now,
            };
            match id {
                Some(id) => {
                    let slot = rows
                        .iter_mut()
                        .find(|row| row.id == id)
                        .ok_or(RepoError::NotFound)?;
                    *slot = record.clone();
                }
                None => rows.push(record.clone()),
            }
            Ok(record)
        }

        async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|row| row.id != id);
            Ok(rows.len() != before)
        }
    }

    fn service(repo: MemoryFaqs) -> (AdminContentService<FaqRecord>, Arc<MemoryFaqs>) {
        let repo = Arc::new(repo);
        (
            AdminContentService::new(repo.clone(), CacheInvalidator::detached()),
            repo,
        )
    }

    fn faq_form() -> FormData {
        FormData::new()
            .with("question", "How long does a build take?")
            .with("answer", "Most sites launch within two weeks.")
            .with("position", "1")
            .with("isPublished", "on")
    }

    #[tokio::test]
    async fn save_then_update_reports_label_message() {
        let (service, repo) = service(MemoryFaqs::default());
        let saved = service.save(&faq_form()).await.expect("created");
        assert_eq!(saved.message, "FAQ saved.");

        let update = FormData::new()
            .with("id", saved.record.id.to_string())
            .with("question", "How long does a build take?")
            .with("answer", "Usually ten business days.");
        let updated = service.save(&update).await.expect("updated");
        assert_eq!(updated.record.id, saved.record.id);
        assert!(!updated.record.is_published);
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_before_persisting() {
        let (service, repo) = service(MemoryFaqs::default());
        let form = FormData::new().with("question", "Why?").with("answer", "short");
        let err = service.save(&form).await.unwrap_err();
        assert!(matches!(err, AdminContentError::Validation(_)));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_maps_to_conflict_message() {
        let (service, _) = service(MemoryFaqs {
            fail_with_duplicate: true,
            ..MemoryFaqs::default()
        });
        let err = service.save(&faq_form()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unable to save FAQ. Name or slug may already exist."
        );
    }

    #[tokio::test]
    async fn delete_requires_an_existing_id() {
        let (service, _) = service(MemoryFaqs::default());

        let err = service.delete(&FormData::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing FAQ ID.");

        let form = FormData::new().with("id", Uuid::new_v4().to_string());
        let err = service.delete(&form).await.unwrap_err();
        assert_eq!(err.to_string(), "FAQ not found.");

        let saved = service.save(&faq_form()).await.unwrap();
        let form = FormData::new().with("id", saved.record.id.to_string());
        assert_eq!(service.delete(&form).await.unwrap(), "FAQ deleted.");
    }

    #[test]
    fn missing_id_messages_use_short_nouns() {
        assert_eq!(
            AdminContentError::MissingId(EntityKind::PricingPackage).to_string(),
            "Missing package ID."
        );
        assert_eq!(
            AdminContentError::MissingId(EntityKind::PortfolioProject).to_string(),
            "Missing project ID."
        );
    }

    #[tokio::test]
    async fn list_reports_totals() {
        let (service, _) = service(MemoryFaqs::default());
        for _ in 0..3 {
            service.save(&faq_form()).await.unwrap();
        }
        let page = service
            .list(&ContentFilter::default(), PageRequest::new(Some(2), 2))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }
}
