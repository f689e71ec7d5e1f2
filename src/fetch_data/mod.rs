pub mod minutes;
pub mod tradier;
pub mod types;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::calendar::{self, NyseCalendar};
use crate::config::ApiConfig;

pub use tradier::{FetchError, TradierClient};

/// Symbols backfilled by `fetch-minutes`, with display names.
pub const MINUTE_SYMBOLS: [(&str, &str); 3] = [
    ("SPX", "S&P 500 Index"),
    ("VIX", "Volatility Index"),
    ("VIX1D", "1-Day VIX"),
];

/// Run the fetch-minutes command: resolve the session window, pull 1-minute
/// bars per symbol and write one NDJSON file per symbol per day.
pub fn run(api: &ApiConfig, output_dir: &Path, days: u32) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;

    let today = calendar::today_in_new_york();
    let window = calendar::session_window(&NyseCalendar, today, days)
        .context("computing trading date range")?;
    if window.sessions.last() != Some(&today) {
        info!(%today, "today is not a trading day, using the last session");
    }
    info!(
        days,
        start = %window.start.format("%Y-%m-%d %H:%M"),
        end = %window.end.format("%Y-%m-%d %H:%M"),
        sessions = window.sessions.len(),
        "fetch window"
    );

    let rt = tokio::runtime::Runtime::new().context("creating async runtime")?;
    rt.block_on(async {
        let client = TradierClient::new(api).context("creating market-data client")?;

        for (symbol, name) in MINUTE_SYMBOLS {
            info!(symbol, name, "fetching minute bars");

            let raw = match client.timesales(symbol, window.start, window.end).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!(symbol, error = %e, "error fetching minute bars");
                    continue;
                }
            };
            if raw.is_empty() {
                warn!(symbol, "no raw data returned");
                continue;
            }

            let bars = minutes::to_minute_bars(&raw, symbol);
            if bars.is_empty() {
                warn!(symbol, "no data available");
                continue;
            }

            let by_day = minutes::group_by_date(bars);
            info!(symbol, days = by_day.len(), "found trading days");
            for (date, day_bars) in &by_day {
                let path = minutes::save_day(output_dir, symbol, *date, day_bars)?;
                info!(symbol, %date, records = day_bars.len(), path = %path.display(), "saved");
            }
        }

        Ok::<(), anyhow::Error>(())
    })?;

    info!("successfully processed all market data");
    Ok(())
}
