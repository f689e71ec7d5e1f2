//! Extract closed-trade lines from a backtest log into CSV.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::info;

pub const DEFAULT_STRATEGY: &str = "SPX Iron Condor";

const HEADERS: [&str; 5] = ["Description", "Date", "Status", "Risk", "P/L"];

/// Dollar amount with optional thousands separators.
const AMOUNT: &str = r"(\d{1,3}(?:,\d{3})*|\d+)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TradeLogRow {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Risk")]
    pub risk: String,
    #[serde(rename = "P/L")]
    pub pl: String,
}

/// Matches `<strategy>, "<date>", <status>, $<risk>, $<p/l>` anywhere in the
/// input, including inside HTML markup.
pub struct TradeLogParser {
    strategy: String,
    pattern: Regex,
}

impl TradeLogParser {
    pub fn new(strategy: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r#"{},\s*"([^"]+)",\s*([^,]+),\s*\${AMOUNT},\s*\${AMOUNT}"#,
            regex::escape(strategy)
        ))?;
        Ok(Self {
            strategy: strategy.to_string(),
            pattern,
        })
    }

    pub fn parse(&self, content: &str) -> Vec<TradeLogRow> {
        self.pattern
            .captures_iter(content)
            .map(|caps| TradeLogRow {
                description: self.strategy.clone(),
                date: caps[1].to_string(),
                status: caps[2].to_string(),
                risk: format!("${}", &caps[3]),
                pl: format!("${}", &caps[4]),
            })
            .collect()
    }
}

/// Write rows with a header, even when there are none.
pub fn write_csv(path: &Path, rows: &[TradeLogRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("creating CSV file {}", path.display()))?;
    wtr.write_record(HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Entry point for the `parse-log` command.
pub fn run(input: &Path, output: &Path, strategy: &str) -> Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("reading log file {}", input.display()))?;
    let parser = TradeLogParser::new(strategy).context("building trade pattern")?;
    let rows = parser.parse(&content);
    write_csv(output, &rows)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = rows.len(),
        "parsed backtest log"
    );
    Ok(())
}
