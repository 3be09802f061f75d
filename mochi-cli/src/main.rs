//! Mochi CLI
//!
//! Command-line interface for triggering backtests on the Mochi launcher.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "mochi")]
#[command(about = "Mochi backtest pipeline CLI", long_about = None)]
struct Cli {
    /// Launcher URL
    #[arg(long, env = "MOCHI_LAUNCHER_URL", default_value = "http://localhost:8080")]
    launcher_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        launcher_url: cli.launcher_url,
    };

    handle_command(cli.command, &config).await
}
