//! NYSE trading calendar and the session arithmetic built on it.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use chrono_tz::America::New_York;
use thiserror::Error;

/// How far back to look for the most recent session.
const LOOKBACK_DAYS: i64 = 10;
/// Calendar-day cap when widening a multi-session window.
const MAX_WINDOW_CALENDAR_DAYS: i64 = 30;

pub const SESSION_OPEN: NaiveTime = match NaiveTime::from_hms_opt(9, 30, 0) {
    Some(t) => t,
    None => panic!("invalid session open"),
};
pub const SESSION_CLOSE: NaiveTime = match NaiveTime::from_hms_opt(16, 0, 0) {
    Some(t) => t,
    None => panic!("invalid session close"),
};
/// End of the window requested for intraday bars (index settlement prints
/// continue after the equity close).
pub const EXTENDED_CLOSE: NaiveTime = match NaiveTime::from_hms_opt(16, 15, 0) {
    Some(t) => t,
    None => panic!("invalid extended close"),
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("no trading session in the {days} days up to {date}")]
    NoRecentSession { date: NaiveDate, days: i64 },

    #[error("no trading sessions between {start} and {end}")]
    EmptyWindow { start: NaiveDate, end: NaiveDate },
}

pub trait TradingCalendar {
    fn is_session(&self, date: NaiveDate) -> bool;
}

// ── NYSE ────────────────────────────────────────────────────────────

/// Unscheduled full-day closures.
const SPECIAL_CLOSURES: &[(i32, u32, u32)] = &[
    (2012, 10, 29), // Hurricane Sandy
    (2012, 10, 30),
    (2018, 12, 5),  // President G.H.W. Bush
    (2025, 1, 9),   // President Carter
];

#[derive(Debug, Clone, Copy, Default)]
pub struct NyseCalendar;

impl NyseCalendar {
    /// Name of the full-day holiday falling on `date`, if any.
    pub fn holiday(&self, date: NaiveDate) -> Option<&'static str> {
        let year = date.year();

        if new_years_observed(year) == Some(date) {
            return Some("New Year's Day");
        }
        if nth_weekday(year, 1, Weekday::Mon, 3) == Some(date) {
            return Some("Martin Luther King Jr. Day");
        }
        if nth_weekday(year, 2, Weekday::Mon, 3) == Some(date) {
            return Some("Washington's Birthday");
        }
        if easter_sunday(year).map(|d| d - Duration::days(2)) == Some(date) {
            return Some("Good Friday");
        }
        if last_weekday(year, 5, Weekday::Mon) == Some(date) {
            return Some("Memorial Day");
        }
        if year >= 2022 && observed(year, 6, 19) == Some(date) {
            return Some("Juneteenth");
        }
        if observed(year, 7, 4) == Some(date) {
            return Some("Independence Day");
        }
        if nth_weekday(year, 9, Weekday::Mon, 1) == Some(date) {
            return Some("Labor Day");
        }
        if nth_weekday(year, 11, Weekday::Thu, 4) == Some(date) {
            return Some("Thanksgiving Day");
        }
        if observed(year, 12, 25) == Some(date) {
            return Some("Christmas Day");
        }
        let ymd = (year, date.month(), date.day());
        if SPECIAL_CLOSURES.contains(&ymd) {
            return Some("Special closure");
        }
        None
    }
}

impl TradingCalendar for NyseCalendar {
    fn is_session(&self, date: NaiveDate) -> bool {
        !is_weekend(date) && self.holiday(date).is_none()
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Fixed-date holiday moved to Friday when on Saturday, Monday when on Sunday.
fn observed(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    })
}

/// New Year's Day on a Saturday is not observed on the prior Friday.
fn new_years_observed(year: i32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(year, 1, 1)?;
    match date.weekday() {
        Weekday::Sat => None,
        Weekday::Sun => Some(date + Duration::days(1)),
        _ => Some(date),
    }
}

fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u8) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let mut date = first_of_next.pred_opt()?;
    while date.weekday() != weekday {
        date = date.pred_opt()?;
    }
    Some(date)
}

/// Gregorian Easter (anonymous Gregorian algorithm).
fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

// ── Session arithmetic ──────────────────────────────────────────────

/// `date` itself if it is a session, otherwise the closest earlier one.
pub fn last_session_on_or_before(
    calendar: &impl TradingCalendar,
    date: NaiveDate,
) -> Result<NaiveDate, CalendarError> {
    (0..=LOOKBACK_DAYS)
        .map(|back| date - Duration::days(back))
        .find(|d| calendar.is_session(*d))
        .ok_or(CalendarError::NoRecentSession {
            date,
            days: LOOKBACK_DAYS,
        })
}

/// Intraday request window covering one or more trading sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionWindow {
    pub sessions: Vec<NaiveDate>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Window ending at the most recent session on or before `today`.
///
/// `days_window == 0` covers that single session. Otherwise the last
/// `days_window` sessions found within `min(2 * days_window, 30)` calendar days
/// are used, so a large window can come back shorter than requested.
pub fn session_window(
    calendar: &impl TradingCalendar,
    today: NaiveDate,
    days_window: u32,
) -> Result<SessionWindow, CalendarError> {
    let current = last_session_on_or_before(calendar, today)?;

    let sessions = if days_window == 0 {
        vec![current]
    } else {
        let span = (i64::from(days_window) * 2).min(MAX_WINDOW_CALENDAR_DAYS);
        let start = current - Duration::days(span);
        let all: Vec<NaiveDate> = start
            .iter_days()
            .take_while(|d| *d <= current)
            .filter(|d| calendar.is_session(*d))
            .collect();
        let keep = all.len().min(days_window as usize);
        all[all.len() - keep..].to_vec()
    };

    let (Some(first), Some(last)) = (sessions.first(), sessions.last()) else {
        return Err(CalendarError::EmptyWindow {
            start: current,
            end: current,
        });
    };

    Ok(SessionWindow {
        start: first.and_time(SESSION_OPEN),
        end: last.and_time(EXTENDED_CLOSE),
        sessions,
    })
}

// ── Market hours ────────────────────────────────────────────────────

/// Regular-hours gate: a session day between 09:30 and 16:00 New York time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketHours<C> {
    calendar: C,
}

impl<C: TradingCalendar> MarketHours<C> {
    pub fn new(calendar: C) -> Self {
        Self { calendar }
    }

    pub fn is_open<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        let local = now.with_timezone(&New_York);
        self.calendar.is_session(local.date_naive())
            && (SESSION_OPEN..=SESSION_CLOSE).contains(&local.time())
    }
}

/// Today's date in New York.
pub fn today_in_new_york() -> NaiveDate {
    chrono::Utc::now().with_timezone(&New_York).date_naive()
}
