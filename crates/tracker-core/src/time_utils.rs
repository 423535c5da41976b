//! Date handling and the `YYYY-MM-DD_H` timestamp keys records are stored
//! under.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Days, NaiveDate};
use regex::Regex;

use crate::error::{Result, TrackerError};

/// Date layout used for both record dates and storage keys.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of hour slots checked for each date.
pub const HOURS_PER_DAY: u8 = 24;

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Parse a `YYYY-MM-DD` date string.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| TrackerError::InvalidDate(s.to_string()))
}

/// Format a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Every date from `start` to `end`, both inclusive.
///
/// Yields nothing when `start > end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let mut next = (start <= end).then_some(start);
    std::iter::from_fn(move || {
        let current = next?;
        next = current
            .checked_add_days(Days::new(1))
            .filter(|candidate| *candidate <= end);
        Some(current)
    })
}

// ── RecordKey ─────────────────────────────────────────────────────────────────

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2})_(\d{1,2})$").expect("regex is valid")
    })
}

/// Identifies the single hourly record for one `(date, hour)` slot.
///
/// Renders as `"{date}_{hour}"` with the hour not zero-padded, e.g.
/// `"2025-01-10_8"`. This string is the sole storage key and is also written
/// into the record's `timestamp` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub date: NaiveDate,
    pub hour: u8,
}

impl RecordKey {
    /// Build a key, rejecting hours outside `0..=23`.
    pub fn new(date: NaiveDate, hour: u8) -> Result<Self> {
        if hour >= HOURS_PER_DAY {
            return Err(TrackerError::InvalidTimestamp(format!(
                "{}_{}",
                format_date(date),
                hour
            )));
        }
        Ok(Self { date, hour })
    }

    /// All 24 keys of `date`, hour 0 first.
    pub fn hours_of(date: NaiveDate) -> impl Iterator<Item = RecordKey> {
        (0..HOURS_PER_DAY).map(move |hour| RecordKey { date, hour })
    }

    /// Storage-key prefix shared by every hour of `date`, e.g. `"2025-01-10_"`.
    pub fn day_prefix(date: NaiveDate) -> String {
        format!("{}_", format_date(date))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.date.format(DATE_FORMAT), self.hour)
    }
}

impl FromStr for RecordKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = key_pattern()
            .captures(s)
            .ok_or_else(|| TrackerError::InvalidTimestamp(s.to_string()))?;
        let date = NaiveDate::parse_from_str(&caps[1], DATE_FORMAT)
            .map_err(|_| TrackerError::InvalidTimestamp(s.to_string()))?;
        let hour: u8 = caps[2]
            .parse()
            .map_err(|_| TrackerError::InvalidTimestamp(s.to_string()))?;
        Self::new(date, hour).map_err(|_| TrackerError::InvalidTimestamp(s.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
