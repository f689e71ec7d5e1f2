pub mod config;
pub mod scheduler;
pub mod sink;

use std::collections::HashMap;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, FixedOffset, Local};
use tracing::{error, info, warn};

use crate::calendar::{MarketHours, NyseCalendar};
use crate::chain;
use crate::config::ApiConfig;
use crate::fetch_data::TradierClient;
use crate::fetch_data::types::Quote;
use crate::model::{MarketSnapshot, SnapshotContext};

use config::CollectorConfig;
use scheduler::PollScheduler;
use sink::ChainCsvSink;

pub const VIX: &str = "VIX";
pub const VIX1D: &str = "VIX1D";

/// CLI-facing settings (before validation).
pub struct CollectArgs {
    pub symbol: String,
    pub dte_days: u32,
    pub output_dir: PathBuf,
    pub check_market_hours: bool,
    pub interval_secs: u64,
    pub closed_sleep_secs: u64,
    pub once: bool,
}

#[derive(Debug, Default)]
struct CycleSummary {
    expirations: u32,
    rows: usize,
    skipped: u32,
    failed: u32,
}

/// Entry point for the `collect` command.
pub fn run(api: &ApiConfig, args: &CollectArgs) -> Result<()> {
    let config = CollectorConfig::from_cli(args)?;

    info!(
        symbol = %config.symbol,
        max_dte = config.max_dte,
        output_dir = %config.output_dir.display(),
        check_market_hours = config.check_market_hours,
        interval = ?config.poll_interval,
        once = config.once,
        "starting chain collector"
    );

    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(run_async(api, config))
}

async fn run_async(api: &ApiConfig, config: CollectorConfig) -> Result<()> {
    let client = TradierClient::new(api).context("creating market-data client")?;
    let sink = ChainCsvSink::new(&config.output_dir, &config.symbol)?;
    let mut scheduler = PollScheduler::new(
        MarketHours::new(NyseCalendar),
        config.check_market_hours,
        config.poll_interval,
        config.closed_interval,
    );

    // Polled across the whole loop; a fresh ctrl_c() misses signals sent
    // before its first poll.
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let now = Local::now().fixed_offset();
        let tick = scheduler.next_tick(now);

        if tick.new_day {
            if let Err(e) = sink.prepare_day(tick.date, config.max_dte) {
                error!(date = %tick.date, error = %format!("{e:#}"), "preparing daily files");
            }
        }

        if tick.market_open {
            let cycle = collect_cycle(&client, &config, &sink, now);
            match until_shutdown(shutdown.as_mut(), cycle).await {
                Some(Ok(summary)) => info!(
                    expirations = summary.expirations,
                    rows = summary.rows,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "cycle complete"
                ),
                Some(Err(e)) => error!(error = %format!("{e:#}"), "error in collection cycle"),
                None => {
                    info!("interrupted during cycle, stopping collector");
                    break;
                }
            }
        } else {
            info!("market closed, sleeping");
        }

        if config.once {
            break;
        }

        let pause = tokio::time::sleep(scheduler.sleep_for(&tick));
        if until_shutdown(shutdown.as_mut(), pause).await.is_none() {
            info!("interrupted, stopping collector");
            break;
        }
    }

    Ok(())
}

/// Drive `work` unless `shutdown` resolves first, in which case `None`.
///
/// `shutdown` is borrowed, not consumed, so the same future can guard every
/// await of a long-running loop.
pub async fn until_shutdown<S, F>(shutdown: Pin<&mut S>, work: F) -> Option<F::Output>
where
    S: Future,
    F: Future,
{
    tokio::select! {
        out = work => Some(out),
        _ = shutdown => None,
    }
}

/// One pass: quotes once, then every expiration from today to `max_dte`.
async fn collect_cycle(
    client: &TradierClient,
    config: &CollectorConfig,
    sink: &ChainCsvSink,
    now: DateTime<FixedOffset>,
) -> Result<CycleSummary> {
    let quotes = client
        .quotes(&[config.symbol.as_str(), VIX, VIX1D])
        .await
        .context("fetching market data")?;
    let market = market_snapshot(&quotes, &config.symbol)?;
    info!(
        symbol = %config.symbol,
        price = market.underlying,
        vix = market.vix,
        vix1d = market.vix1d,
        "fetched market data"
    );

    let today = now.date_naive();
    let mut summary = CycleSummary::default();

    for dte in 0..=config.max_dte {
        let ctx = SnapshotContext {
            symbol: config.symbol.clone(),
            market,
            expiration: today + Duration::days(i64::from(dte)),
            as_of: now,
        };
        match collect_expiration(client, sink, &ctx, dte).await {
            Ok(Some(rows)) => {
                summary.expirations += 1;
                summary.rows += rows;
            }
            Ok(None) => summary.skipped += 1,
            Err(e) => {
                error!(dte, error = %format!("{e:#}"), "error processing DTE");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn collect_expiration(
    client: &TradierClient,
    sink: &ChainCsvSink,
    ctx: &SnapshotContext,
    dte: u32,
) -> Result<Option<usize>> {
    let records = client
        .option_chain(&ctx.symbol, ctx.expiration)
        .await
        .with_context(|| format!("fetching options chain for {}", ctx.expiration))?;

    let Some(rows) = chain::process_snapshot(&records, ctx) else {
        warn!(dte, expiration = %ctx.expiration, "skipping DTE due to missing options data");
        return Ok(None);
    };

    let path = sink.append(dte, ctx.as_of.date_naive(), &rows)?;
    info!(dte, rows = rows.len(), path = %path.display(), "saved data");
    Ok(Some(rows.len()))
}

/// Underlying last price is required; volatility indices default to 0.
pub fn market_snapshot(quotes: &HashMap<String, Quote>, symbol: &str) -> Result<MarketSnapshot> {
    let last = |s: &str| quotes.get(s).and_then(|q| q.last);
    let underlying =
        last(symbol).ok_or_else(|| anyhow!("invalid market data: no last price for {symbol}"))?;

    Ok(MarketSnapshot {
        underlying,
        vix: last(VIX).unwrap_or(0.0),
        vix1d: last(VIX1D).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, last: Option<f64>) -> (String, Quote) {
        (
            symbol.to_string(),
            Quote {
                symbol: symbol.to_string(),
                description: None,
                last,
            },
        )
    }

    #[test]
    fn test_market_snapshot_defaults_vol_indices() {
        let quotes: HashMap<String, Quote> =
            [quote("SPX", Some(5012.3)), quote("VIX1D", None)].into_iter().collect();
        let snap = market_snapshot(&quotes, "SPX").unwrap();
        assert_eq!(snap.underlying, 5012.3);
        assert_eq!(snap.vix, 0.0);
        assert_eq!(snap.vix1d, 0.0);
    }

    #[tokio::test]
    async fn test_until_shutdown_returns_work_output() {
        let shutdown = std::future::pending::<()>();
        tokio::pin!(shutdown);
        assert_eq!(until_shutdown(shutdown.as_mut(), async { 7 }).await, Some(7));
        assert_eq!(until_shutdown(shutdown.as_mut(), async { 8 }).await, Some(8));
    }

    #[tokio::test]
    async fn test_until_shutdown_abandons_work() {
        let shutdown = std::future::ready(());
        tokio::pin!(shutdown);
        let work = std::future::pending::<u32>();
        assert_eq!(until_shutdown(shutdown.as_mut(), work).await, None);
    }

    #[test]
    fn test_market_snapshot_requires_underlying() {
        let quotes: HashMap<String, Quote> =
            [quote("SPX", None), quote("VIX", Some(14.2))].into_iter().collect();
        let err = market_snapshot(&quotes, "SPX").unwrap_err();
        assert!(err.to_string().contains("no last price for SPX"));
    }
}
