//! Health command handler

use anyhow::Result;
use colored::*;
use mochi_client::LauncherClient;

use crate::config::Config;

pub async fn handle_health(config: &Config) -> Result<()> {
    let client = LauncherClient::new(&config.launcher_url);

    match client.health().await {
        Ok(()) => {
            println!("{} {}", "✓ Launcher is up at".green(), client.base_url());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗ Launcher unreachable at".red(), client.base_url());
            Err(e.into())
        }
    }
}
