//! Supabase Storage adapter for admin media uploads.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Url, header};
use serde::Deserialize;
use serde_json::json;

use crate::application::admin::{MediaStorage, StorageError};
use crate::config::StorageSettings;

/// Objects live under `{base}/storage/v1/object/{bucket}/{path}` and are
/// served publicly from `{base}/storage/v1/object/public/{bucket}/{path}`.
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    service_role_key: String,
    bucket: String,
}

#[derive(Deserialize, Default)]
struct StorageErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl SupabaseStorage {
    pub fn new(client: Client, base_url: &str, service_role_key: String, bucket: String) -> Self {
        Self {
            client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            service_role_key,
            bucket,
        }
    }

    fn object_url(&self, path: &str) -> Result<Url, StorageError> {
        self.url(&format!("storage/v1/object/{}/{path}", self.bucket))
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.bucket
        )
    }

    fn url(&self, suffix: &str) -> Result<Url, StorageError> {
        Url::parse(&format!("{}/{suffix}", self.base_url))
            .map_err(|err| StorageError::Rejected(format!("invalid storage URL: {err}")))
    }

    async fn rejection(response: reqwest::Response) -> StorageError {
        let status = response.status();
        let body = response
            .json::<StorageErrorBody>()
            .await
            .unwrap_or_default();
        let detail = body
            .message
            .or(body.error)
            .unwrap_or_else(|| status.to_string());
        StorageError::Rejected(detail)
    }
}

fn transport(err: reqwest::Error) -> StorageError {
    StorageError::Transport(err.to_string())
}

#[async_trait]
impl MediaStorage for SupabaseStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, path: &str, body: Bytes, content_type: &str) -> Result<String, StorageError> {
        let response = self
            .client
            .post(self.object_url(path)?)
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
            .header(header::CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(body)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(self.public_url(path))
    }

    async fn remove(&self, path: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.url(&format!("storage/v1/object/{}", self.bucket))?)
            .bearer_auth(&self.service_role_key)
            .header("apikey", &self.service_role_key)
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }
}

/// Stand-in used while storage settings are incomplete. Every call reports
/// which variables are missing.
#[derive(Clone)]
pub struct UnconfiguredStorage {
    missing: Vec<&'static str>,
}

impl UnconfiguredStorage {
    pub fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }
}

#[async_trait]
impl MediaStorage for UnconfiguredStorage {
    fn bucket(&self) -> &str {
        ""
    }

    async fn put(&self, _path: &str, _body: Bytes, _content_type: &str) -> Result<String, StorageError> {
        Err(StorageError::NotConfigured(self.missing.clone()))
    }

    async fn remove(&self, _path: &str) -> Result<(), StorageError> {
        Err(StorageError::NotConfigured(self.missing.clone()))
    }
}

pub fn build_storage(settings: &StorageSettings, client: Client) -> Arc<dyn MediaStorage> {
    match (
        settings.supabase_url.as_deref(),
        settings.service_role_key.as_ref(),
        settings.bucket.as_ref(),
    ) {
        (Some(url), Some(key), Some(bucket)) => Arc::new(SupabaseStorage::new(
            client,
            url,
            key.clone(),
            bucket.clone(),
        )),
        _ => Arc::new(UnconfiguredStorage::new(settings.missing_keys())),
    }
}
