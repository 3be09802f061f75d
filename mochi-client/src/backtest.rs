//! Backtest launch endpoints

use crate::LauncherClient;
use crate::error::Result;
use mochi_core::dto::backtest::{LaunchBacktest, LaunchResponse};
use mochi_core::dto::echo::EchoResponse;

impl LauncherClient {
    /// Trigger a backtest job chain
    ///
    /// # Arguments
    /// * `req` - The backtest parameters
    ///
    /// # Returns
    /// The group tag and the ids of the key jobs
    pub async fn launch_backtest(&self, req: &LaunchBacktest) -> Result<LaunchResponse> {
        tracing::debug!("Launching backtest for {}", req.ticker);

        let response = self
            .client
            .post(self.url("/backtest"))
            .json(req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Ask the launcher which ticker it would process, without submitting jobs
    pub async fn echo(&self, ticker: &str) -> Result<EchoResponse> {
        let response = self
            .client
            .post(self.url("/echo"))
            .json(&serde_json::json!({ "ticker": ticker }))
            .send()
            .await?;

        self.handle_response(response).await
    }
}
