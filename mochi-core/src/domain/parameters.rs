//! Parameter record persisted for every launch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::artifact::ArtifactKey;
use crate::domain::group_tag::GroupTag;
use crate::domain::request::PipelineRequest;

/// Snapshot of the resolved request, keyed by group tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    #[serde(flatten)]
    pub request: PipelineRequest,
    #[serde(rename = "groupTag")]
    pub group_tag: GroupTag,
    pub timestamp: DateTime<Utc>,
}

impl ParameterRecord {
    pub fn new(request: PipelineRequest, group_tag: GroupTag, timestamp: DateTime<Utc>) -> Self {
        Self {
            request,
            group_tag,
            timestamp,
        }
    }

    /// Key the record is stored under: `{group_tag}.json`
    pub fn key(&self) -> ArtifactKey {
        ArtifactKey::parameter_record(&self.group_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_record_document() {
        let request = PipelineRequest::from_event(&json!({
            "ticker": "AAPL",
            "from_date": "2024-01-01",
            "to_date": "2024-06-01",
            "shortATRPeriod": 5,
            "longATRPeriod": 20,
            "alpha": 0.1
        }))
        .unwrap();
        let tag: GroupTag = serde_json::from_value(json!("kiwi-otter--20240101120000")).unwrap();
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        let record = ParameterRecord::new(request, tag, timestamp);
        let document = serde_json::to_value(&record).unwrap();

        assert_eq!(record.key().as_str(), "kiwi-otter--20240101120000.json");
        assert_eq!(document["ticker"], "AAPL");
        assert_eq!(document["tradeTimeout"], 4);
        assert_eq!(document["groupTag"], "kiwi-otter--20240101120000");
        assert_eq!(document["timestamp"], "2024-01-01T12:00:00Z");

        let restored: ParameterRecord = serde_json::from_value(document).unwrap();
        assert_eq!(restored, record);
    }
}
