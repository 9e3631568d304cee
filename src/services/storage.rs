//! Object storage for case assets and profile images

use async_trait::async_trait;
use std::time::Duration;

use crate::config::storage::StorageConfig;
use crate::error::{AppError, Result};

/// A file received from a client, not yet stored
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Where an upload landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub url: String,
    pub size: i64,
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, file: &UploadFile) -> Result<StoredObject>;
    async fn delete(&self, url: &str) -> Result<()>;
}

/// Keep only characters that are safe in an object key
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches(['.', '_']).is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

fn object_key(file_name: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4(), sanitize_file_name(file_name))
}

/// Object store reached over plain HTTP `PUT`/`DELETE`
pub struct HttpObjectStorage {
    client: reqwest::Client,
    base_url: String,
    public_url: String,
    token: Option<String>,
}

impl HttpObjectStorage {
    /// `None` when no storage URL is configured
    pub fn from_config(config: &StorageConfig, timeout: Duration) -> Result<Option<Self>> {
        let Some(base_url) = config.base_url.as_deref() else {
            return Ok(None);
        };
        let base_url = base_url.trim_end_matches('/').to_string();
        let public_url = config
            .public_url
            .as_deref()
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| base_url.clone());

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Some(Self {
            client,
            base_url,
            public_url,
            token: config.token.clone(),
        }))
    }

    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(&self.public_url)
            .or_else(|| url.strip_prefix(&self.base_url))
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|key| !key.is_empty())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, file: &UploadFile) -> Result<StoredObject> {
        let key = object_key(&file.file_name);
        let content_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let request = self
            .client
            .put(format!("{}/{}", self.base_url, key))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(file.bytes.clone());

        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "Upload rejected by storage: {}",
                response.status()
            )));
        }

        tracing::debug!(key = %key, size = file.bytes.len(), "Object uploaded");

        Ok(StoredObject {
            url: format!("{}/{}", self.public_url, key),
            size: file.bytes.len() as i64,
        })
    }

    async fn delete(&self, url: &str) -> Result<()> {
        let key = self
            .key_for_url(url)
            .ok_or_else(|| AppError::BadRequest(format!("Not a managed object: {}", url)))?;

        let request = self.client.delete(format!("{}/{}", self.base_url, key));
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Delete failed: {}", e)))?;

        // Already gone is as good as deleted
        if response.status().is_success() || response.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(AppError::Upstream(format!(
                "Delete rejected by storage: {}",
                response.status()
            )))
        }
    }
}

/// Used when no storage is configured; uploads fail, deletes are no-ops
pub struct DisabledStorage;

#[async_trait]
impl ObjectStorage for DisabledStorage {
    async fn upload(&self, file: &UploadFile) -> Result<StoredObject> {
        tracing::warn!(file = %file.file_name, "Object storage not configured, rejecting upload");
        Err(AppError::Upstream(
            "Object storage is not configured".to_string(),
        ))
    }

    async fn delete(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}
