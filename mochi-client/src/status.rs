//! Health endpoint

use crate::LauncherClient;
use crate::error::{ClientError, Result};

impl LauncherClient {
    /// Check that the launcher is up
    pub async fn health(&self) -> Result<()> {
        let response = self.client.get(self.url("/health")).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::api_error(status.as_u16(), body));
        }

        Ok(())
    }
}
