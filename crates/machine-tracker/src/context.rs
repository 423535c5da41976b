//! Per-invocation request context.
//!
//! Everything that depends on who is running the command and when it runs
//! is resolved here once and then passed down explicitly.

use chrono::{Days, Local, NaiveDate, NaiveDateTime, Timelike};
use tracker_core::error::{Result, TrackerError};
use tracker_core::settings::Settings;
use tracker_core::time_utils::RecordKey;

/// Days covered by a trend report when no start date is given, end included.
pub const DEFAULT_TREND_DAYS: u64 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub username: Option<String>,
    pub now: NaiveDateTime,
}

impl RequestContext {
    pub fn new(username: Option<String>, now: NaiveDateTime) -> Self {
        Self { username, now }
    }

    /// Context for this run, stamped with local wall-clock time.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.username.clone(), Local::now().naive_local())
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    /// The `(date, hour)` slot addressed by optional CLI values, defaulting to
    /// the current hour of today.
    pub fn slot(&self, date: Option<NaiveDate>, hour: Option<u8>) -> Result<RecordKey> {
        let date = date.unwrap_or_else(|| self.today());
        // hour() is always 0..=23
        let hour = hour.unwrap_or(self.now.hour() as u8);
        RecordKey::new(date, hour)
    }

    /// Inclusive trend window; `end` defaults to today and `start` to a week
    /// before `end`.
    pub fn trend_window(
        &self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> (NaiveDate, NaiveDate) {
        let end = end.unwrap_or_else(|| self.today());
        let start = start.unwrap_or_else(|| {
            end.checked_sub_days(Days::new(DEFAULT_TREND_DAYS - 1))
                .unwrap_or(end)
        });
        (start, end)
    }

    /// Name to stamp on saved records.
    pub fn recorded_by(&self) -> Result<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                TrackerError::Config(
                    "no username given; pass --username once and it will be remembered"
                        .to_string(),
                )
            })
    }
}
