//! Backtest launch DTOs

use serde::{Deserialize, Serialize};

use crate::domain::group_tag::GroupTag;
use crate::domain::job::{JobId, JobRef};

/// Body of `POST /backtest` as sent by the client tooling
///
/// The launcher itself parses the body leniently (see
/// [`crate::domain::request::PipelineRequest`]); this type is what well-behaved
/// callers send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchBacktest {
    pub ticker: String,
    pub from_date: String,
    pub to_date: String,
    #[serde(rename = "shortATRPeriod")]
    pub short_atr_period: u32,
    #[serde(rename = "longATRPeriod")]
    pub long_atr_period: u32,
    pub alpha: f64,
    #[serde(
        rename = "tradeDuration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_duration: Option<u32>,
    #[serde(
        rename = "tradeTimeout",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub trade_timeout: Option<u32>,
}

/// Successful launch response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchResponse {
    pub message: String,
    /// Ingestion job id, or `"skipped"` when the data already existed
    pub polygon_job_id: JobRef,
    pub enhance_job_id: JobId,
    pub trades_job_id: JobId,
    pub group_tag: GroupTag,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Pipeline stage whose submission failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    /// Tag of a partially submitted chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_tag: Option<GroupTag>,
    /// Jobs accepted before the failure; they keep running
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submitted_jobs: Vec<StageJob>,
}

impl ErrorResponse {
    /// An error with no pipeline context
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            stage: None,
            group_tag: None,
            submitted_jobs: Vec::new(),
        }
    }
}

/// A job submitted for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageJob {
    pub stage: String,
    pub job_id: JobId,
}
