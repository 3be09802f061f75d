//! Echo command handler

use anyhow::Result;
use colored::*;
use mochi_client::LauncherClient;

use crate::config::Config;

pub async fn handle_echo(ticker: &str, config: &Config) -> Result<()> {
    let client = LauncherClient::new(&config.launcher_url);
    let echoed = client.echo(ticker).await?;

    println!("{}", echoed.message.bold());
    println!("  Ticker: {}", echoed.ticker.cyan());

    Ok(())
}
