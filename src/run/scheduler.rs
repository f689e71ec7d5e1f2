use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::calendar::{MarketHours, TradingCalendar};

/// What the collector should do on this pass of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Local calendar date of this pass.
    pub date: NaiveDate,
    /// First pass on `date`; daily files need to be prepared.
    pub new_day: bool,
    pub market_open: bool,
}

/// Decides when the poll loop collects and how long it sleeps in between.
pub struct PollScheduler<C> {
    hours: MarketHours<C>,
    check_market_hours: bool,
    poll_interval: Duration,
    closed_interval: Duration,
    last_date: Option<NaiveDate>,
}

impl<C: TradingCalendar> PollScheduler<C> {
    pub fn new(
        hours: MarketHours<C>,
        check_market_hours: bool,
        poll_interval: Duration,
        closed_interval: Duration,
    ) -> Self {
        Self {
            hours,
            check_market_hours,
            poll_interval,
            closed_interval,
            last_date: None,
        }
    }

    pub fn next_tick(&mut self, now: DateTime<FixedOffset>) -> Tick {
        let date = now.date_naive();
        let new_day = self.last_date != Some(date);
        self.last_date = Some(date);

        Tick {
            date,
            new_day,
            market_open: !self.check_market_hours || self.hours.is_open(&now),
        }
    }

    pub fn sleep_for(&self, tick: &Tick) -> Duration {
        if tick.market_open {
            self.poll_interval
        } else {
            self.closed_interval
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::NyseCalendar;

    fn at(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn scheduler(check: bool) -> PollScheduler<NyseCalendar> {
        PollScheduler::new(
            MarketHours::new(NyseCalendar),
            check,
            Duration::from_secs(25),
            Duration::from_secs(60),
        )
    }

    #[test]
    fn test_new_day_detection() {
        let mut s = scheduler(false);
        assert!(s.next_tick(at("2025-01-15T10:00:00-05:00")).new_day);
        assert!(!s.next_tick(at("2025-01-15T10:00:25-05:00")).new_day);
        assert!(s.next_tick(at("2025-01-16T00:00:05-05:00")).new_day);
    }

    #[test]
    fn test_market_hours_gate() {
        let mut s = scheduler(true);
        let open = s.next_tick(at("2025-01-15T10:00:00-05:00"));
        assert!(open.market_open);
        assert_eq!(s.sleep_for(&open), Duration::from_secs(25));

        // Saturday
        let closed = s.next_tick(at("2025-01-18T10:00:00-05:00"));
        assert!(!closed.market_open);
        assert_eq!(s.sleep_for(&closed), Duration::from_secs(60));

        // Same instant expressed in UTC, after the close
        assert!(!s.next_tick(at("2025-01-15T21:30:00+00:00")).market_open);
    }

    #[test]
    fn test_gate_disabled_always_collects() {
        let mut s = scheduler(false);
        assert!(s.next_tick(at("2025-01-18T03:00:00-05:00")).market_open);
    }
}
