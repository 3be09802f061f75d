//! API Error Handling
//!
//! Unified error types and conversion for API responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mochi_core::domain::group_tag::GroupTag;
use mochi_core::dto::backtest::{ErrorResponse, StageJob};

use crate::service::LaunchError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// The batch backend refused a stage; `submitted` jobs keep running
    SubmissionFailed {
        stage: String,
        message: String,
        group_tag: GroupTag,
        submitted: Vec<StageJob>,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorResponse::message(msg)),
            ApiError::SubmissionFailed {
                stage,
                message,
                group_tag,
                submitted,
            } => {
                tracing::error!(
                    "Submission failed at {} for {} ({} jobs already queued): {}",
                    stage,
                    group_tag,
                    submitted.len(),
                    message
                );
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse {
                        error: message,
                        stage: Some(stage),
                        group_tag: Some(group_tag),
                        submitted_jobs: submitted,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<LaunchError> for ApiError {
    fn from(err: LaunchError) -> Self {
        match err {
            LaunchError::Validation(e) => ApiError::BadRequest(e.to_string()),
            LaunchError::Submission {
                stage,
                group_tag,
                submitted,
                source,
            } => ApiError::SubmissionFailed {
                stage: stage.name().to_string(),
                message: format!("Failed to submit {} job: {}", stage.name(), source),
                group_tag,
                submitted: submitted
                    .into_iter()
                    .map(|job| StageJob {
                        stage: job.stage.name().to_string(),
                        job_id: job.job_id,
                    })
                    .collect(),
            },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use crate::service::SubmittedJob;
    use mochi_core::domain::job::JobId;
    use mochi_core::domain::request::ValidationError;
    use mochi_core::domain::stage::Stage;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = ApiError::from(LaunchError::Validation(ValidationError::MissingField("alpha")));

        match err {
            ApiError::BadRequest(msg) => assert!(msg.contains("alpha")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_submission_maps_to_bad_gateway() {
        let group_tag: GroupTag = serde_json::from_str("\"fig-yak--20240101000000\"").unwrap();
        let err = ApiError::from(LaunchError::Submission {
            stage: Stage::Metadata,
            group_tag: group_tag.clone(),
            submitted: vec![SubmittedJob {
                stage: Stage::Enhance,
                job_id: JobId::new("e-1"),
            }],
            source: BackendError::rejected(400, "no such definition"),
        });

        match &err {
            ApiError::SubmissionFailed {
                stage,
                message,
                group_tag: tag,
                submitted,
            } => {
                assert_eq!(stage, "ticker-meta");
                assert!(message.contains("no such definition"));
                assert_eq!(tag, &group_tag);
                assert_eq!(
                    submitted,
                    &vec![StageJob {
                        stage: "trade-data-enhancer".to_string(),
                        job_id: JobId::new("e-1"),
                    }]
                );
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
