//! Object store trait and the HTTP-backed implementation.
//!
//! Persistent stores accept raw bytes plus upload metadata and hand back a
//! dereferenceable public URL. Failure is assumed idempotent — no partial
//! writes become visible.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{MuninnError, Result};

/// Metadata accompanying an upload.
#[derive(Debug, Clone)]
pub struct UploadMetadata {
    /// File name hint for the stored object.
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Handle to a stored object.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredObject {
    /// Public, dereferenceable URL.
    pub url: String,
    /// Store-assigned id, usable with `delete`.
    pub id: String,
}

/// A persistent object-storage provider.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store name for logging and the asset record.
    fn name(&self) -> &str;

    /// Upload bytes, returning the stored object's public URL and id.
    async fn upload(&self, bytes: &[u8], metadata: &UploadMetadata) -> Result<StoredObject>;

    /// Delete a previously stored object by id.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Object store speaking a simple HTTP upload API.
///
/// - `POST   {base}/v1/files` — upload (raw body, metadata in headers)
/// - `DELETE {base}/v1/files/{id}` — delete
#[derive(Clone)]
pub struct HttpObjectStore {
    name: String,
    api_key: String,
    http: Client,
    base_url: String,
}

impl HttpObjectStore {
    /// Create a store client against a custom base URL.
    pub fn new(
        name: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build HTTP client");
        Self {
            name: name.into(),
            api_key: api_key.into(),
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn upload(&self, bytes: &[u8], metadata: &UploadMetadata) -> Result<StoredObject> {
        let url = format!("{}/v1/files", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header(reqwest::header::CONTENT_TYPE, &metadata.mime_type)
            .header("X-File-Name", &metadata.file_name)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MuninnError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let url = format!("{}/v1/files/{}", self.base_url, id);
        let response = self
            .http
            .delete(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| MuninnError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() && status.as_u16() != 404 {
            let message = response.text().await.unwrap_or_default();
            return Err(MuninnError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
