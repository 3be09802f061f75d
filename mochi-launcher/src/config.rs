//! Launcher configuration
//!
//! Every bucket name and secret the launcher passes on to jobs is read once at
//! startup into an immutable [`LauncherConfig`], which is then handed to the
//! pipeline launcher explicitly. Nothing below the binary entry point reads
//! the process environment.

use anyhow::{Context, Result};
use std::fmt;

/// Queue every job is submitted to unless `JOB_QUEUE` says otherwise
pub const DEFAULT_JOB_QUEUE: &str = "fargateSpotTrades";

/// Address the HTTP server binds to unless `LAUNCHER_BIND_ADDR` says otherwise
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Environment variable names
pub mod vars {
    pub const RAW_BUCKET: &str = "RAW_BUCKET_NAME";
    pub const PREPARED_BUCKET: &str = "PREPARED_BUCKET_NAME";
    pub const TRADES_BUCKET: &str = "TRADES_BUCKET_NAME";
    pub const TRADER_BUCKET: &str = "TRADER_BUCKET_NAME";
    pub const AGGREGATION_BUCKET: &str = "MOCHI_AGGREGATION_BUCKET";
    pub const AGGREGATION_STAGING_BUCKET: &str = "MOCHI_AGGREGATION_BUCKET_STAGING";
    pub const GRAPHS_BUCKET: &str = "MOCHI_GRAPHS_BUCKET";
    pub const TRADE_EXTRACTS_BUCKET: &str = "MOCHI_PROD_TRADE_EXTRACTS";
    pub const TICKER_META_BUCKET: &str = "TICKER_META_BUCKET_NAME";
    pub const BACKTEST_PARAMS_BUCKET: &str = "BACKTEST_PARAMS_BUCKET_NAME";
    pub const POLYGON_API_KEY: &str = "POLYGON_API_KEY";
    pub const JOB_QUEUE: &str = "JOB_QUEUE";
    pub const BIND_ADDR: &str = "LAUNCHER_BIND_ADDR";
    pub const BACKEND_MODE: &str = "BACKEND_MODE";
    pub const BATCH_BACKEND_URL: &str = "BATCH_BACKEND_URL";
    pub const ARTIFACT_STORE_URL: &str = "ARTIFACT_STORE_URL";
}

/// A value that must never show up in logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Artifact containers the pipeline reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    pub raw: String,
    pub prepared: String,
    pub trades: String,
    pub traders: String,
    pub aggregation: String,
    pub aggregation_staging: String,
    pub graphs: String,
    pub trade_extracts: String,
    pub ticker_meta: String,
    pub backtest_params: String,
}

/// Which backend adapters the launcher talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    /// Remote batch backend and artifact store over HTTP
    Http {
        batch_url: String,
        artifact_url: String,
    },
    /// In-process recording backends, for local development
    Memory,
}

/// Launcher configuration
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub bind_addr: String,
    pub job_queue: String,
    pub buckets: Buckets,
    pub polygon_api_key: Secret,
    pub backend: BackendMode,
}

impl LauncherConfig {
    /// Creates configuration from environment variables
    ///
    /// Required: every bucket variable in [`vars`] and `POLYGON_API_KEY`;
    /// `BATCH_BACKEND_URL` and `ARTIFACT_STORE_URL` unless `BACKEND_MODE=memory`.
    /// Optional: `JOB_QUEUE`, `LAUNCHER_BIND_ADDR`, `BACKEND_MODE`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Creates configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .with_context(|| format!("{} environment variable not set", name))
        };

        let buckets = Buckets {
            raw: required(vars::RAW_BUCKET)?,
            prepared: required(vars::PREPARED_BUCKET)?,
            trades: required(vars::TRADES_BUCKET)?,
            traders: required(vars::TRADER_BUCKET)?,
            aggregation: required(vars::AGGREGATION_BUCKET)?,
            aggregation_staging: required(vars::AGGREGATION_STAGING_BUCKET)?,
            graphs: required(vars::GRAPHS_BUCKET)?,
            trade_extracts: required(vars::TRADE_EXTRACTS_BUCKET)?,
            ticker_meta: required(vars::TICKER_META_BUCKET)?,
            backtest_params: required(vars::BACKTEST_PARAMS_BUCKET)?,
        };

        let polygon_api_key = Secret::new(required(vars::POLYGON_API_KEY)?);

        let backend = match lookup(vars::BACKEND_MODE).as_deref().map(str::trim) {
            None | Some("") | Some("http") => BackendMode::Http {
                batch_url: required(vars::BATCH_BACKEND_URL)?,
                artifact_url: required(vars::ARTIFACT_STORE_URL)?,
            },
            Some("memory") => BackendMode::Memory,
            Some(other) => anyhow::bail!(
                "{} must be 'http' or 'memory', got '{}'",
                vars::BACKEND_MODE,
                other
            ),
        };

        Ok(Self {
            bind_addr: lookup(vars::BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            job_queue: lookup(vars::JOB_QUEUE).unwrap_or_else(|| DEFAULT_JOB_QUEUE.to_string()),
            buckets,
            polygon_api_key,
            backend,
        })
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.job_queue.trim().is_empty() {
            anyhow::bail!("job_queue cannot be empty");
        }

        if self.bind_addr.trim().is_empty() {
            anyhow::bail!("bind_addr cannot be empty");
        }

        if let BackendMode::Http {
            batch_url,
            artifact_url,
        } = &self.backend
        {
            for url in [batch_url, artifact_url] {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("backend url '{}' must start with http:// or https://", url);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, String> {
        [
            (vars::RAW_BUCKET, "raw"),
            (vars::PREPARED_BUCKET, "prepared"),
            (vars::TRADES_BUCKET, "trades"),
            (vars::TRADER_BUCKET, "traders"),
            (vars::AGGREGATION_BUCKET, "aggregation"),
            (vars::AGGREGATION_STAGING_BUCKET, "aggregation-staging"),
            (vars::GRAPHS_BUCKET, "graphs"),
            (vars::TRADE_EXTRACTS_BUCKET, "extracts"),
            (vars::TICKER_META_BUCKET, "ticker-meta"),
            (vars::BACKTEST_PARAMS_BUCKET, "params"),
            (vars::POLYGON_API_KEY, "pk_test"),
            (vars::BATCH_BACKEND_URL, "http://batch.local"),
            (vars::ARTIFACT_STORE_URL, "http://store.local"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    fn load(env: &HashMap<&'static str, String>) -> Result<LauncherConfig> {
        LauncherConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_env()).unwrap();

        assert_eq!(config.job_queue, "fargateSpotTrades");
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.buckets.aggregation_staging, "aggregation-staging");
        assert_eq!(config.polygon_api_key.expose(), "pk_test");
        assert_eq!(
            config.backend,
            BackendMode::Http {
                batch_url: "http://batch.local".to_string(),
                artifact_url: "http://store.local".to_string(),
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_bucket_is_named() {
        let mut env = base_env();
        env.remove(vars::GRAPHS_BUCKET);

        let err = load(&env).unwrap_err();
        assert!(err.to_string().contains("MOCHI_GRAPHS_BUCKET"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut env = base_env();
        env.insert(vars::POLYGON_API_KEY, "  ".to_string());

        assert!(load(&env).is_err());
    }

    #[test]
    fn test_memory_mode_needs_no_urls() {
        let mut env = base_env();
        env.remove(vars::BATCH_BACKEND_URL);
        env.remove(vars::ARTIFACT_STORE_URL);
        env.insert(vars::BACKEND_MODE, "memory".to_string());

        let config = load(&env).unwrap();
        assert_eq!(config.backend, BackendMode::Memory);
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let mut env = base_env();
        env.insert(vars::BACKEND_MODE, "carrier-pigeon".to_string());

        assert!(load(&env).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_url() {
        let mut env = base_env();
        env.insert(vars::BATCH_BACKEND_URL, "batch.local".to_string());

        let config = load(&env).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secret_redacted_in_debug() {
        let config = load(&base_env()).unwrap();
        let rendered = format!("{:?}", config);

        assert!(!rendered.contains("pk_test"));
        assert!(rendered.contains("Secret(***)"));
    }
}
