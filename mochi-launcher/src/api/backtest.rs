//! Backtest API Handler
//!
//! Trigger endpoint for the job chain.

use axum::{Json, body::Bytes, extract::State};
use mochi_core::dto::backtest::LaunchResponse;

use crate::api::error::ApiResult;
use crate::state::AppState;

/// POST /backtest
/// Validate the trigger and submit the job chain
///
/// The body is taken raw so proxy envelopes (`{"body": "..."}`) and bare
/// request objects are both accepted.
pub async fn launch_backtest(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<LaunchResponse>> {
    tracing::debug!("Received backtest trigger ({} bytes)", body.len());

    let receipt = state.launcher.launch_event(&body).await?;

    Ok(Json(LaunchResponse {
        message: format!("Successfully submitted job chain for {}", receipt.ticker),
        polygon_job_id: receipt.ingest,
        enhance_job_id: receipt.enhance,
        trades_job_id: receipt.trades,
        group_tag: receipt.group_tag,
    }))
}
