//! Batch execution backend
//!
//! Submits job nodes and returns the identifiers the backend assigns.
//! The backend starts a job only once everything in its dependency list has
//! succeeded; the launcher relies on that and never polls.

use async_trait::async_trait;
use mochi_core::domain::job::{JobId, JobNode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::BackendError;

/// Backend trait for job submission
#[async_trait]
pub trait BatchBackend: Send + Sync {
    /// Submits a job
    ///
    /// # Arguments
    /// * `node` - The job to submit; its dependencies must already be submitted
    ///
    /// # Returns
    /// The identifier assigned by the backend
    async fn submit_job(&self, node: &JobNode) -> Result<JobId, BackendError>;
}

/// HTTP implementation of BatchBackend
///
/// `POST {base_url}/jobs` with a [`JobSubmission`] body, answered by
/// `{"jobId": "..."}`.
#[derive(Debug, Clone)]
pub struct HttpBatchBackend {
    client: Client,
    base_url: String,
}

impl HttpBatchBackend {
    /// Creates a new HTTP batch backend
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the batch API (e.g., "http://batch.internal")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Creates a new HTTP batch backend with a configured reqwest client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BatchBackend for HttpBatchBackend {
    async fn submit_job(&self, node: &JobNode) -> Result<JobId, BackendError> {
        let url = format!("{}/jobs", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&JobSubmission::from(node))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::rejected(status.as_u16(), body));
        }

        let submitted = response
            .json::<JobSubmitted>()
            .await
            .map_err(|e| BackendError::InvalidResponse(format!("Failed to parse job id: {}", e)))?;

        Ok(JobId::new(submitted.job_id))
    }
}

/// Wire format of a job submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job_name: String,
    pub job_queue: String,
    pub job_definition: String,
    pub command: Vec<String>,
    pub environment: Vec<EnvironmentVariable>,
    pub depends_on: Vec<JobDependency>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDependency {
    pub job_id: String,
}

impl From<&JobNode> for JobSubmission {
    fn from(node: &JobNode) -> Self {
        Self {
            job_name: node.name.clone(),
            job_queue: node.queue.clone(),
            job_definition: node.definition.clone(),
            command: node.command.clone(),
            environment: node
                .environment
                .iter()
                .map(|(name, value)| EnvironmentVariable {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
            depends_on: node
                .depends_on
                .iter()
                .map(|id| JobDependency {
                    job_id: id.to_string(),
                })
                .collect(),
            tags: node.tags.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobSubmitted {
    job_id: String,
}
