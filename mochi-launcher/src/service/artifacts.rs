//! Artifact Service
//!
//! Decides whether the raw market data a launch needs is already stored.

use mochi_core::domain::artifact::ArtifactKey;

use crate::backend::{ArtifactStore, ObjectStatus};

/// Check that every key exists in the bucket
///
/// Stops at the first missing key. A failed probe is logged and counts as
/// missing: re-fetching data is cheaper than skipping work that was needed.
pub async fn all_artifacts_exist(
    store: &dyn ArtifactStore,
    bucket: &str,
    keys: &[&ArtifactKey],
) -> bool {
    for key in keys {
        match store.head_object(bucket, key).await {
            Ok(ObjectStatus::Present) => {
                tracing::debug!("File exists: {}/{}", bucket, key);
            }
            Ok(ObjectStatus::Missing) => {
                tracing::info!("File doesn't exist: {}/{}", bucket, key);
                return false;
            }
            Err(e) => {
                tracing::warn!(
                    "Error checking file {}/{}, assuming it is missing: {}",
                    bucket,
                    key,
                    e
                );
                return false;
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryArtifactStore;
    use mochi_core::domain::artifact::MarketDataKeys;

    #[tokio::test]
    async fn test_all_present() {
        let keys = MarketDataKeys::for_ticker("AAPL");
        let store = InMemoryArtifactStore::new()
            .with_object("raw", &keys.minute)
            .with_object("raw", &keys.hour)
            .with_object("raw", &keys.day);

        assert!(all_artifacts_exist(&store, "raw", &keys.all()).await);
        assert_eq!(store.probe_count(), 3);
    }

    #[tokio::test]
    async fn test_any_missing() {
        let keys = MarketDataKeys::for_ticker("AAPL");

        for absent in 0..3 {
            let mut store = InMemoryArtifactStore::new();
            for (i, key) in keys.all().into_iter().enumerate() {
                if i != absent {
                    store = store.with_object("raw", key);
                }
            }

            assert!(!all_artifacts_exist(&store, "raw", &keys.all()).await);
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_missing() {
        let keys = MarketDataKeys::for_ticker("AAPL");
        let store = InMemoryArtifactStore::new().with_object("raw", &keys.day);

        assert!(!all_artifacts_exist(&store, "raw", &keys.all()).await);
        assert_eq!(store.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_probe_error_means_missing() {
        let keys = MarketDataKeys::for_ticker("AAPL");
        let store = InMemoryArtifactStore::new()
            .with_object("raw", &keys.minute)
            .with_object("raw", &keys.hour)
            .with_object("raw", &keys.day)
            .failing_probes();

        assert!(!all_artifacts_exist(&store, "raw", &keys.all()).await);
    }

    #[tokio::test]
    async fn test_wrong_bucket() {
        let keys = MarketDataKeys::for_ticker("AAPL");
        let store = InMemoryArtifactStore::new()
            .with_object("prepared", &keys.minute)
            .with_object("prepared", &keys.hour)
            .with_object("prepared", &keys.day);

        assert!(!all_artifacts_exist(&store, "raw", &keys.all()).await);
    }
}
