use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::debug;

use crate::model::{DerivedRow, HEADERS};

/// Appends snapshot rows to one CSV per (symbol, DTE, day).
pub struct ChainCsvSink {
    output_dir: PathBuf,
    symbol: String,
}

impl ChainCsvSink {
    pub fn new(output_dir: &Path, symbol: &str) -> Result<Self> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            symbol: symbol.to_string(),
        })
    }

    pub fn path(&self, dte: u32, date: NaiveDate) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}DTE_{}.csv",
            self.symbol,
            dte,
            date.format("%Y%m%d")
        ))
    }

    /// Create the day's files with a header row for every DTE up to `max_dte`.
    /// Existing files are left alone.
    pub fn prepare_day(&self, date: NaiveDate, max_dte: u32) -> Result<()> {
        for dte in 0..=max_dte {
            let path = self.path(dte, date);
            if !path.exists() {
                self.writer(&path)?.flush()?;
                debug!(path = %path.display(), "created daily file");
            }
        }
        Ok(())
    }

    pub fn append(&self, dte: u32, date: NaiveDate, rows: &[DerivedRow]) -> Result<PathBuf> {
        let path = self.path(dte, date);
        let mut wtr = self.writer(&path)?;
        for row in rows {
            wtr.serialize(row)
                .with_context(|| format!("writing row to {}", path.display()))?;
        }
        wtr.flush()
            .with_context(|| format!("flushing {}", path.display()))?;
        Ok(path)
    }

    /// Append-mode writer; writes the header first when the file is empty.
    fn writer(&self, path: &Path) -> Result<csv::Writer<std::fs::File>> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let is_empty = file.metadata().map(|m| m.len() == 0).unwrap_or(false);

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if is_empty {
            wtr.write_record(HEADERS)?;
        }
        Ok(wtr)
    }
}
