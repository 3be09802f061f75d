//! Artifact keys
//!
//! Deterministic storage paths for the data a launch reads or writes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::group_tag::GroupTag;

/// Asset class every market-data key lives under
pub const ASSET_TYPE_STOCKS: &str = "stocks";

/// Upstream market-data provider
pub const SOURCE_POLYGON: &str = "polygon";

/// Bar granularity of a market-data file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Minute,
    Hour,
    Day,
}

impl Timeframe {
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute => "min",
            Timeframe::Hour => "hour",
            Timeframe::Day => "day",
        }
    }
}

/// Key of one object in the artifact store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactKey(String);

impl ArtifactKey {
    /// Key of a raw market-data file
    ///
    /// `{asset_type}/{ticker}/{source}/{ticker}_{source}_{timeframe}.csv.lzo`
    pub fn market_data(ticker: &str, asset_type: &str, source: &str, timeframe: Timeframe) -> Self {
        Self(format!(
            "{asset_type}/{ticker}/{source}/{ticker}_{source}_{}.csv.lzo",
            timeframe.as_str()
        ))
    }

    /// Key of the parameter record written for a launch
    pub fn parameter_record(group_tag: &GroupTag) -> Self {
        Self(format!("{}.json", group_tag))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The three raw market-data files a backtest needs
///
/// These keys do not depend on the group tag: data fetched by an earlier
/// launch is reused by later ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDataKeys {
    pub minute: ArtifactKey,
    pub hour: ArtifactKey,
    pub day: ArtifactKey,
}

impl MarketDataKeys {
    pub fn for_ticker(ticker: &str) -> Self {
        let key = |timeframe| {
            ArtifactKey::market_data(ticker, ASSET_TYPE_STOCKS, SOURCE_POLYGON, timeframe)
        };

        Self {
            minute: key(Timeframe::Minute),
            hour: key(Timeframe::Hour),
            day: key(Timeframe::Day),
        }
    }

    /// All keys, minute first
    pub fn all(&self) -> [&ArtifactKey; 3] {
        [&self.minute, &self.hour, &self.day]
    }
}
