//! Error types for the Mochi client

use mochi_core::domain::group_tag::GroupTag;
use mochi_core::dto::backtest::StageJob;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Mochi client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The launcher accepted the trigger but a stage could not be submitted.
    /// Jobs in `submitted_jobs` were queued before the failure and keep running.
    #[error(
        "Submission failed at stage {stage} for {}: {message} ({} jobs already submitted)",
        group_label(.group_tag),
        .submitted_jobs.len()
    )]
    SubmissionFailed {
        stage: String,
        message: String,
        group_tag: Option<GroupTag>,
        submitted_jobs: Vec<StageJob>,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The launcher rejected the request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::SubmissionFailed { .. })
            || matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

fn group_label(group_tag: &Option<GroupTag>) -> String {
    group_tag
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "unknown group".to_string())
}
