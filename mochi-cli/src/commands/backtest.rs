//! Backtest command handlers

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use mochi_client::{LaunchBacktest, LaunchResponse, LauncherClient};

use crate::config::Config;

/// Backtest subcommands
#[derive(Subcommand)]
pub enum BacktestCommands {
    /// Submit a backtest job chain
    Launch(LaunchArgs),
}

/// Parameters of a backtest launch
#[derive(Args, Debug)]
pub struct LaunchArgs {
    /// Ticker symbol
    #[arg(short, long, env = "TICKER", default_value = "AAPL")]
    pub ticker: String,

    /// First day of data (YYYY-MM-DD)
    #[arg(long, env = "FROM_DATE", default_value = "2025-03-21")]
    pub from_date: String,

    /// Last day of data (YYYY-MM-DD)
    #[arg(long, env = "TO_DATE", default_value = "2050-03-16")]
    pub to_date: String,

    /// Short ATR period
    #[arg(long, default_value = "5")]
    pub short_atr_period: u32,

    /// Long ATR period
    #[arg(long, default_value = "20")]
    pub long_atr_period: u32,

    /// Smoothing factor in (0, 1]
    #[arg(long, default_value = "0.1")]
    pub alpha: f64,

    /// Trade duration in hours (launcher default applies when omitted)
    #[arg(long)]
    pub trade_duration: Option<u32>,

    /// Trade timeout in hours (launcher default applies when omitted)
    #[arg(long)]
    pub trade_timeout: Option<u32>,

    /// Print the raw JSON response
    #[arg(long)]
    pub json: bool,
}

impl LaunchArgs {
    pub fn to_request(&self) -> LaunchBacktest {
        LaunchBacktest {
            ticker: self.ticker.clone(),
            from_date: self.from_date.clone(),
            to_date: self.to_date.clone(),
            short_atr_period: self.short_atr_period,
            long_atr_period: self.long_atr_period,
            alpha: self.alpha,
            trade_duration: self.trade_duration,
            trade_timeout: self.trade_timeout,
        }
    }
}

/// Handle backtest commands
pub async fn handle_backtest_command(command: BacktestCommands, config: &Config) -> Result<()> {
    let client = LauncherClient::new(&config.launcher_url);

    match command {
        BacktestCommands::Launch(args) => launch_backtest(&client, &args).await,
    }
}

async fn launch_backtest(client: &LauncherClient, args: &LaunchArgs) -> Result<()> {
    let req = args.to_request();

    let launched = client
        .launch_backtest(&req)
        .await
        .with_context(|| format!("Failed to launch backtest for {}", req.ticker))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&launched)?);
    } else {
        print_launch(&req, &launched);
    }

    Ok(())
}

fn print_launch(req: &LaunchBacktest, launched: &LaunchResponse) {
    println!("{}", format!("✓ {}", launched.message).green().bold());
    println!("  Group tag: {}", launched.group_tag.to_string().cyan());
    println!("  Range:     {} → {}", req.from_date, req.to_date);

    let ingest = if launched.polygon_job_id.is_skipped() {
        "skipped (data already present)".dimmed().to_string()
    } else {
        launched.polygon_job_id.to_string()
    };
    println!("  Ingest:    {}", ingest);
    println!("  Enhance:   {}", launched.enhance_job_id.to_string().dimmed());
    println!("  Trades:    {}", launched.trades_job_id.to_string().dimmed());
}
