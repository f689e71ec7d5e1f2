//! Subscriber setup: human-readable events on stderr plus a per-day log file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_PREFIX: &str = "market_data";

/// Install the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init(log_dir: &Path) -> Result<()> {
    let daily = DailyFile::open(log_dir, LOG_PREFIX)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(daily))
        .try_init()
        .context("installing tracing subscriber")?;
    Ok(())
}

pub fn log_path(dir: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{prefix}_{}.log", date.format("%Y%m%d")))
}

// ── Daily file writer ───────────────────────────────────────────────

struct DailyState {
    date: NaiveDate,
    file: File,
}

/// Appends to `<dir>/<prefix>_YYYYMMDD.log`, switching files when the local
/// date changes.
pub struct DailyFile {
    dir: PathBuf,
    prefix: String,
    state: Mutex<DailyState>,
}

impl DailyFile {
    pub fn open(dir: &Path, prefix: &str) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
        let date = Local::now().date_naive();
        let path = log_path(dir, prefix, date);
        let file = append(&path).with_context(|| format!("opening log file {}", path.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            state: Mutex::new(DailyState { date, file }),
        })
    }

    fn lock_for(&self, today: NaiveDate) -> MutexGuard<'_, DailyState> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.date != today {
            // One attempt per day; on failure keep writing to the old file.
            state.date = today;
            let path = log_path(&self.dir, &self.prefix, today);
            match append(&path) {
                Ok(file) => state.file = file,
                Err(e) => eprintln!("cannot open log file {}: {e}", path.display()),
            }
        }
        state
    }
}

fn append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

pub struct DailyFileWriter<'a> {
    state: MutexGuard<'a, DailyState>,
}

impl Write for DailyFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.state.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.file.flush()
    }
}

impl<'a> MakeWriter<'a> for DailyFile {
    type Writer = DailyFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        DailyFileWriter {
            state: self.lock_for(Local::now().date_naive()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_path_format() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(
            log_path(Path::new("logs"), "market_data", date),
            PathBuf::from("logs/market_data_20250307.log")
        );
    }

    #[test]
    fn test_daily_file_rolls_over() {
        let dir = std::env::temp_dir().join(format!("chain-tape-logs-{}", std::process::id()));
        let daily = DailyFile::open(&dir, "test").unwrap();

        daily.make_writer().write_all(b"first\n").unwrap();
        let tomorrow = Local::now().date_naive().succ_opt().unwrap();
        {
            let mut writer = DailyFileWriter {
                state: daily.lock_for(tomorrow),
            };
            writer.write_all(b"second\n").unwrap();
        }

        let today_log = std::fs::read_to_string(log_path(&dir, "test", Local::now().date_naive())).unwrap();
        let next_log = std::fs::read_to_string(log_path(&dir, "test", tomorrow)).unwrap();
        assert!(today_log.contains("first"));
        assert_eq!(next_log, "second\n");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failed_rollover_is_not_retried() {
        let dir = std::env::temp_dir().join(format!("chain-tape-logs-gone-{}", std::process::id()));
        let daily = DailyFile::open(&dir, "test").unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let tomorrow = Local::now().date_naive().succ_opt().unwrap();
        {
            let mut writer = DailyFileWriter {
                state: daily.lock_for(tomorrow),
            };
            assert_eq!(writer.state.date, tomorrow);
            writer.write_all(b"still logging\n").unwrap();
        }

        // Recreating the directory does not trigger another open for the same day.
        std::fs::create_dir_all(&dir).unwrap();
        drop(daily.lock_for(tomorrow));
        assert!(!log_path(&dir, "test", tomorrow).exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
