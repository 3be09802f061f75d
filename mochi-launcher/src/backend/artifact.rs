//! Artifact store
//!
//! Key-addressed blob storage. The launcher only needs two operations:
//! probing whether an object exists and writing a small JSON document.

use async_trait::async_trait;
use mochi_core::domain::artifact::ArtifactKey;
use reqwest::{Client, StatusCode, Url};

use super::BackendError;

/// Result of an existence probe
///
/// "Not found" is an answer, not an error; failed probes come back as
/// [`BackendError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectStatus {
    Present,
    Missing,
}

/// Store trait for artifact operations
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Probes whether an object exists
    ///
    /// # Arguments
    /// * `bucket` - The container to look in
    /// * `key` - The object key
    async fn head_object(&self, bucket: &str, key: &ArtifactKey)
    -> Result<ObjectStatus, BackendError>;

    /// Writes a JSON document, replacing any existing object
    ///
    /// # Arguments
    /// * `bucket` - The container to write to
    /// * `key` - The object key
    /// * `document` - The document body
    async fn put_json(
        &self,
        bucket: &str,
        key: &ArtifactKey,
        document: &serde_json::Value,
    ) -> Result<(), BackendError>;
}

/// HTTP implementation of ArtifactStore
///
/// Objects live at `{base_url}/{bucket}/{key}`: `HEAD` probes, `PUT` writes.
#[derive(Debug, Clone)]
pub struct HttpArtifactStore {
    client: Client,
    base_url: String,
}

impl HttpArtifactStore {
    /// Creates a new HTTP artifact store
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the store (e.g., "http://artifacts.internal")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a new HTTP artifact store with a configured reqwest client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// `{base_url}/{bucket}/{key}` with every path segment percent-encoded
    fn object_url(&self, bucket: &str, key: &ArtifactKey) -> Result<Url, BackendError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| BackendError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .push(bucket)
            .extend(key.as_str().split('/'));

        Ok(url)
    }
}

#[async_trait]
impl ArtifactStore for HttpArtifactStore {
    async fn head_object(
        &self,
        bucket: &str,
        key: &ArtifactKey,
    ) -> Result<ObjectStatus, BackendError> {
        let response = self.client.head(self.object_url(bucket, key)?).send().await?;

        match response.status() {
            status if status.is_success() => Ok(ObjectStatus::Present),
            StatusCode::NOT_FOUND => Ok(ObjectStatus::Missing),
            status => Err(BackendError::rejected(
                status.as_u16(),
                format!("existence probe for {}/{} failed", bucket, key),
            )),
        }
    }

    async fn put_json(
        &self,
        bucket: &str,
        key: &ArtifactKey,
        document: &serde_json::Value,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .put(self.object_url(bucket, key)?)
            .json(document)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::rejected(status.as_u16(), body));
        }

        Ok(())
    }
}
