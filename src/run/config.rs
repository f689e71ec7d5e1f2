use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};

/// Validated settings for the `collect` command.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub symbol: String,
    pub max_dte: u32,
    pub output_dir: PathBuf,
    pub check_market_hours: bool,
    pub poll_interval: Duration,
    pub closed_interval: Duration,
    pub once: bool,
}

impl CollectorConfig {
    pub fn from_cli(cli: &crate::run::CollectArgs) -> Result<Self> {
        let symbol = cli.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            bail!("Symbol must not be empty.");
        }
        if symbol.contains(',') {
            bail!("Invalid symbol '{symbol}'. Pass a single underlying symbol.");
        }
        if cli.interval_secs == 0 {
            bail!("--interval-secs must be at least 1.");
        }
        if cli.closed_sleep_secs == 0 {
            bail!("--closed-sleep-secs must be at least 1.");
        }

        Ok(CollectorConfig {
            symbol,
            max_dte: cli.dte_days,
            output_dir: cli.output_dir.clone(),
            check_market_hours: cli.check_market_hours,
            poll_interval: Duration::from_secs(cli.interval_secs),
            closed_interval: Duration::from_secs(cli.closed_sleep_secs),
            once: cli.once,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::CollectArgs;

    fn args() -> CollectArgs {
        CollectArgs {
            symbol: " spx ".to_string(),
            dte_days: 7,
            output_dir: PathBuf::from("data2"),
            check_market_hours: false,
            interval_secs: 25,
            closed_sleep_secs: 60,
            once: false,
        }
    }

    #[test]
    fn test_normalizes_symbol() {
        let cfg = CollectorConfig::from_cli(&args()).unwrap();
        assert_eq!(cfg.symbol, "SPX");
        assert_eq!(cfg.poll_interval, Duration::from_secs(25));
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut a = args();
        a.symbol = "SPX,NDX".to_string();
        assert!(CollectorConfig::from_cli(&a).is_err());

        let mut a = args();
        a.interval_secs = 0;
        assert!(CollectorConfig::from_cli(&a).is_err());
    }
}
