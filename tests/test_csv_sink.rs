use std::path::PathBuf;

use chrono::{DateTime, NaiveDate};
use serde_json::json;

use chain_tape::chain::process_snapshot;
use chain_tape::model::{HEADERS, MarketSnapshot, RawOption, SnapshotContext};
use chain_tape::run::sink::ChainCsvSink;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("chain-tape-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn rows() -> Vec<chain_tape::model::DerivedRow> {
    let records: Vec<RawOption> = vec![
        serde_json::from_value(json!({"symbol": "C5000", "strike": 5000, "option_type": "call", "bid": 10, "ask": 10.4})).unwrap(),
        serde_json::from_value(json!({"symbol": "P5000", "strike": 5000, "option_type": "put", "bid": 9, "ask": 9.2})).unwrap(),
    ];
    let ctx = SnapshotContext {
        symbol: "SPX".to_string(),
        market: MarketSnapshot {
            underlying: 5001.0,
            vix: 15.0,
            vix1d: 11.0,
        },
        expiration: NaiveDate::from_ymd_opt(2025, 1, 16).unwrap(),
        as_of: DateTime::parse_from_rfc3339("2025-01-15T10:00:00-05:00").unwrap(),
    };
    process_snapshot(&records, &ctx).unwrap()
}

#[test]
fn test_file_naming() {
    let dir = scratch_dir("naming");
    let sink = ChainCsvSink::new(&dir, "SPX").unwrap();
    let path = sink.path(3, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
    assert_eq!(path, dir.join("SPX_3DTE_20250115.csv"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_header_written_once() {
    let dir = scratch_dir("header");
    let sink = ChainCsvSink::new(&dir, "SPX").unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

    let rows = rows();
    let path = sink.append(1, day, &rows).unwrap();
    sink.append(1, day, &rows).unwrap();

    let out = std::fs::read_to_string(&path).unwrap();
    let header = HEADERS.join(",");
    assert_eq!(out.lines().filter(|l| *l == header).count(), 1);
    assert_eq!(out.lines().count(), 1 + 2 * rows.len());
    assert!(out.starts_with(&header));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_prepare_day_keeps_existing_rows() {
    let dir = scratch_dir("prepare");
    let sink = ChainCsvSink::new(&dir, "SPX").unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();

    sink.prepare_day(day, 2).unwrap();
    for dte in 0..=2 {
        let out = std::fs::read_to_string(sink.path(dte, day)).unwrap();
        assert_eq!(out.lines().count(), 1);
    }

    sink.append(0, day, &rows()).unwrap();
    sink.prepare_day(day, 2).unwrap();
    let out = std::fs::read_to_string(sink.path(0, day)).unwrap();
    assert_eq!(out.lines().count(), 3);

    let _ = std::fs::remove_dir_all(&dir);
}
