use clap::Parser;

use chain_tape::config::ApiConfig;
use chain_tape::{fetch_data, logging, run, trade_log};

mod cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logging::init(&cli.log_dir)?;

    match cli.command {
        cli::Command::Collect {
            symbol,
            dte_days,
            output_dir,
            check_market_hours,
            interval_secs,
            closed_sleep_secs,
            once,
        } => {
            let api = ApiConfig::resolve(&cli.base_url, cli.api_key)?;
            run::run(&api, &run::CollectArgs {
                symbol,
                dte_days,
                output_dir,
                check_market_hours,
                interval_secs,
                closed_sleep_secs,
                once,
            })
        }
        cli::Command::FetchMinutes { days, output_dir } => {
            let api = ApiConfig::resolve(&cli.base_url, cli.api_key)?;
            fetch_data::run(&api, &output_dir, days)
        }
        cli::Command::ParseLog {
            input,
            output,
            strategy,
        } => trade_log::run(&input, &output, &strategy),
    }
}
