use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chain_tape::config::{API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL};
use chain_tape::trade_log::DEFAULT_STRATEGY;

/// Index option-chain recorder: polls quotes and chains, derives spread and
/// butterfly values, and writes flat files for later analysis.
#[derive(Parser)]
#[command(name = "chain-tape", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Market-data API key (falls back to a .api_key file)
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Market-data API base URL
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory for daily log files
    #[arg(long, global = true, default_value = "logs")]
    pub log_dir: PathBuf,
}

#[derive(Subcommand)]
pub enum Command {
    /// Poll option chains for 0..=N DTE and append derived rows to daily CSVs
    Collect {
        /// Underlying symbol
        #[arg(long, default_value = "SPX")]
        symbol: String,

        /// Highest days-to-expiration to collect (0 = same-day only)
        #[arg(long, default_value = "7")]
        dte_days: u32,

        /// Output directory for the per-DTE CSV files
        #[arg(long, default_value = "data2")]
        output_dir: PathBuf,

        /// Only collect during regular trading hours
        #[arg(long)]
        check_market_hours: bool,

        /// Seconds between collection passes
        #[arg(long, default_value = "25")]
        interval_secs: u64,

        /// Seconds to sleep while the market is closed
        #[arg(long, default_value = "60")]
        closed_sleep_secs: u64,

        /// Run a single pass then exit (for external cron)
        #[arg(long)]
        once: bool,
    },

    /// Fetch 1-minute bars for SPX, VIX and VIX1D over recent trading days
    FetchMinutes {
        /// Number of trading days to fetch (0 = most recent session only)
        #[arg(long, default_value = "10")]
        days: u32,

        /// Output directory for NDJSON files
        #[arg(long, default_value = "data2")]
        output_dir: PathBuf,
    },

    /// Extract trade lines from a backtest log into CSV
    ParseLog {
        /// Backtest log (text or HTML)
        #[arg(long, default_value = "spx-options-data/oa_backtest.log")]
        input: PathBuf,

        /// CSV file to write
        #[arg(long, short = 'o', default_value = "output.csv")]
        output: PathBuf,

        /// Strategy label that starts each trade line
        #[arg(long, default_value = DEFAULT_STRATEGY)]
        strategy: String,
    },
}
