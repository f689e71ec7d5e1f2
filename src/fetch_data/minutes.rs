use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use chrono_tz::America::New_York;
use serde::Serialize;
use tracing::{debug, warn};

use super::types::RawBar;
use crate::calendar::SESSION_OPEN;

/// Regular-session bars expected per day: 09:31 through 16:14.
pub const EXPECTED_MINUTES: i64 = 404;

/// One persisted minute bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinuteBar {
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Price")]
    pub price: Option<f64>,
    #[serde(rename = "Open")]
    pub open: Option<f64>,
    #[serde(rename = "High")]
    pub high: Option<f64>,
    #[serde(rename = "Low")]
    pub low: Option<f64>,
    #[serde(rename = "Close")]
    pub close: Option<f64>,
    #[serde(rename = "Afterhours")]
    pub afterhours: u8,
    #[serde(skip)]
    pub local: NaiveDateTime,
}

/// Outside 09:30..=16:15 New York time.
pub fn is_afterhours(t: NaiveTime) -> bool {
    let hhmm = t.hour() * 100 + t.minute();
    !(930..=1615).contains(&hhmm)
}

/// Convert raw bars, dropping ones whose timestamp does not parse or does not
/// exist in New York (DST gap).
pub fn to_minute_bars(raw: &[RawBar], symbol: &str) -> Vec<MinuteBar> {
    raw.iter()
        .filter_map(|bar| {
            let local = match NaiveDateTime::parse_from_str(&bar.time, "%Y-%m-%dT%H:%M:%S") {
                Ok(t) => t,
                Err(e) => {
                    debug!(symbol, time = %bar.time, error = %e, "skipping bar with bad time");
                    return None;
                }
            };
            let Some(zoned) = New_York.from_local_datetime(&local).earliest() else {
                debug!(symbol, time = %bar.time, "skipping bar in DST gap");
                return None;
            };
            Some(MinuteBar {
                time: zoned.format("%Y-%m-%dT%H:%M:%S%z").to_string(),
                symbol: symbol.to_string(),
                price: bar.close,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                afterhours: u8::from(is_afterhours(local.time())),
                local,
            })
        })
        .collect()
}

pub fn group_by_date(bars: Vec<MinuteBar>) -> BTreeMap<NaiveDate, Vec<MinuteBar>> {
    let mut days: BTreeMap<NaiveDate, Vec<MinuteBar>> = BTreeMap::new();
    for bar in bars {
        days.entry(bar.local.date()).or_default().push(bar);
    }
    days
}

/// Regular-session minutes with no bar, in order.
pub fn missing_minutes(bars: &[MinuteBar]) -> Vec<NaiveTime> {
    let present: BTreeSet<NaiveTime> = bars.iter().map(|b| b.local.time()).collect();
    let first = SESSION_OPEN + Duration::minutes(1);
    (0..EXPECTED_MINUTES)
        .map(|i| first + Duration::minutes(i))
        .filter(|t| !present.contains(t))
        .collect()
}

pub fn daily_filename(symbol: &str, date: NaiveDate, complete: bool) -> String {
    format!(
        "{}_min_{}_{}.ndjson",
        symbol,
        date.format("%Y%m%d"),
        if complete { "complete" } else { "partial" }
    )
}

/// Write one day of bars as NDJSON, named by completeness. Returns the path.
pub fn save_day(output_dir: &Path, symbol: &str, date: NaiveDate, bars: &[MinuteBar]) -> Result<PathBuf> {
    let missing = missing_minutes(bars);
    if !missing.is_empty() {
        warn!(
            symbol,
            %date,
            missing = missing.len(),
            "incomplete trading day"
        );
        for t in &missing {
            warn!(symbol, %date, minute = %t.format("%H:%M"), "missing minute");
        }
    }

    let path = output_dir.join(daily_filename(symbol, date, missing.is_empty()));
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for bar in bars {
        serde_json::to_writer(&mut out, bar)?;
        out.write_all(b"\n")?;
    }
    out.flush()
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
