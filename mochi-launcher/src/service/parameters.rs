//! Parameter Service
//!
//! Persists the parameter record of a launch. Best-effort: by the time this
//! runs the jobs are already queued, so a failed write only costs the record.

use mochi_core::domain::parameters::ParameterRecord;

use crate::backend::ArtifactStore;

/// Write the record under `{group_tag}.json`
///
/// Returns whether the record was stored. Failures are logged, never raised.
pub async fn persist_parameters(
    store: &dyn ArtifactStore,
    bucket: &str,
    record: &ParameterRecord,
) -> bool {
    let key = record.key();

    let document = match serde_json::to_value(record) {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Failed to serialize parameters for {}: {}", record.group_tag, e);
            return false;
        }
    };

    match store.put_json(bucket, &key, &document).await {
        Ok(()) => {
            tracing::info!("Stored backtest parameters at {}/{}", bucket, key);
            true
        }
        Err(e) => {
            tracing::warn!(
                "Failed to store backtest parameters at {}/{}: {}",
                bucket,
                key,
                e
            );
            false
        }
    }
}
