//! Mochi HTTP Client
//!
//! A type-safe HTTP client for the Mochi launcher API.
//!
//! # Example
//!
//! ```no_run
//! use mochi_client::LauncherClient;
//! use mochi_core::dto::backtest::LaunchBacktest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = LauncherClient::new("http://localhost:8080");
//!
//!     let launched = client.launch_backtest(&LaunchBacktest {
//!         ticker: "AAPL".to_string(),
//!         from_date: "2024-01-01".to_string(),
//!         to_date: "2024-06-01".to_string(),
//!         short_atr_period: 5,
//!         long_atr_period: 20,
//!         alpha: 0.1,
//!         trade_duration: None,
//!         trade_timeout: None,
//!     }).await?;
//!
//!     println!("Launched {}", launched.group_tag);
//!     Ok(())
//! }
//! ```

mod backtest;
pub mod error;
mod status;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use mochi_core::dto::backtest::{LaunchBacktest, LaunchResponse};
pub use mochi_core::dto::echo::EchoResponse;

use mochi_core::dto::backtest::ErrorResponse;
use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the Mochi launcher API
#[derive(Debug, Clone)]
pub struct LauncherClient {
    /// Base URL of the launcher (e.g., "http://localhost:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl LauncherClient {
    /// Create a new launcher client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the launcher API (e.g., "http://localhost:8080")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new launcher client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the launcher
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize the JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(error_from_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Turn a failed response into the most specific error its body allows
fn error_from_body(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            error,
            stage: Some(stage),
            group_tag,
            submitted_jobs,
        }) => ClientError::SubmissionFailed {
            stage,
            message: error,
            group_tag,
            submitted_jobs,
        },
        Ok(ErrorResponse {
            error, stage: None, ..
        }) if status == 400 => {
            ClientError::InvalidRequest(error)
        }
        Ok(ErrorResponse { error, .. }) => ClientError::api_error(status, error),
        Err(_) => ClientError::api_error(status, body),
    }
}
