//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod backtest;
mod echo;
mod health;
mod tag;

pub use backtest::BacktestCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Backtest launches
    Backtest {
        #[command(subcommand)]
        command: BacktestCommands,
    },
    /// Ask the launcher which ticker it would process, without submitting jobs
    Echo {
        /// Ticker symbol
        #[arg(short, long)]
        ticker: String,
    },
    /// Check that the launcher is reachable
    Health,
    /// Print a fresh group tag
    Tag,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Backtest { command } => backtest::handle_backtest_command(command, config).await,
        Commands::Echo { ticker } => echo::handle_echo(&ticker, config).await,
        Commands::Health => health::handle_health(config).await,
        Commands::Tag => {
            tag::print_tag();
            Ok(())
        }
    }
}
