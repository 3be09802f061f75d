//! Backend layer
//!
//! Adapters for the two external collaborators the launcher depends on:
//! - the batch execution backend, which accepts job submissions
//! - the artifact store, which answers existence probes and stores JSON documents
//!
//! Both are trait-based so the pipeline service can run against the HTTP
//! adapters in production and the in-memory ones in development and tests.

mod artifact;
mod batch;
mod memory;

use thiserror::Error;

// Re-export traits
pub use artifact::{ArtifactStore, ObjectStatus};
pub use batch::BatchBackend;

// Re-export implementations
pub use artifact::HttpArtifactStore;
pub use batch::{HttpBatchBackend, JobSubmission};
pub use memory::{InMemoryArtifactStore, InMemoryBatchBackend, RecordedSubmission};

/// Errors raised by backend adapters
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never got a response
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("backend rejected request (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The configured endpoint cannot address an object
    #[error("invalid backend url: {0}")]
    InvalidUrl(String),

    /// The backend answered with something we could not read
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// The backend is unavailable
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl BackendError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}
