use chrono::{DateTime, FixedOffset, NaiveDate};

/// Underlying and volatility-index last prices from one quote fetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketSnapshot {
    pub underlying: f64,
    pub vix: f64,
    pub vix1d: f64,
}

/// Everything a pipeline call needs besides the chain itself.
#[derive(Debug, Clone)]
pub struct SnapshotContext {
    pub symbol: String,
    pub market: MarketSnapshot,
    pub expiration: NaiveDate,
    pub as_of: DateTime<FixedOffset>,
}

impl SnapshotContext {
    /// Calendar days from the as-of date to expiration. Not clamped.
    pub fn dte(&self) -> i64 {
        (self.expiration - self.as_of.date_naive()).num_days()
    }

    pub fn time_label(&self) -> String {
        self.as_of.format("%Y-%m-%dT%H:%M:%S%z").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(expiration: NaiveDate) -> SnapshotContext {
        SnapshotContext {
            symbol: "SPX".to_string(),
            market: MarketSnapshot {
                underlying: 5000.0,
                vix: 14.0,
                vix1d: 11.0,
            },
            expiration,
            as_of: DateTime::parse_from_rfc3339("2025-01-15T10:30:00-05:00").unwrap(),
        }
    }

    #[test]
    fn test_dte_can_be_negative() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        assert_eq!(ctx(d(15)).dte(), 0);
        assert_eq!(ctx(d(17)).dte(), 2);
        assert_eq!(ctx(d(13)).dte(), -2);
    }

    #[test]
    fn test_time_label_keeps_offset() {
        let c = ctx(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(c.time_label(), "2025-01-15T10:30:00-0500");
    }
}
