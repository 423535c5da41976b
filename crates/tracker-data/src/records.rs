//! Hourly record persistence.
//!
//! [`RecordStore`] maps `(date, hour)` keys onto an injected
//! [`KeyValueStore`]. Reads never fail from the caller's point of view: any
//! storage or decoding problem is logged and reported as "no data".

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, warn};
use tracker_core::error::Result;
use tracker_core::models::HourlyRecord;
use tracker_core::time_utils::{dates_between, parse_date, RecordKey};

use crate::store::KeyValueStore;

/// Typed access to hourly records over any key-value backend.
#[derive(Debug, Clone)]
pub struct RecordStore<S> {
    store: S,
}

impl<S: KeyValueStore> RecordStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &S {
        &self.store
    }

    // ── Writes ────────────────────────────────────────────────────────────────

    /// Serialize `record` and write it under `key`, replacing whatever was
    /// there. Not retried; the error is logged and handed back so the caller
    /// can tell the user.
    pub fn save(&self, key: &RecordKey, record: &HourlyRecord) -> Result<()> {
        let result = serde_json::to_vec_pretty(record)
            .map_err(Into::into)
            .and_then(|bytes| self.store.put(&key.to_string(), &bytes));

        match &result {
            Ok(()) => debug!(%key, machines = record.machines.len(), "record saved"),
            Err(e) => warn!(%key, error = %e, "failed to save record"),
        }
        result
    }

    /// [`RecordStore::save`] under the record's own `(date, hour)`.
    pub fn save_record(&self, record: &HourlyRecord) -> Result<()> {
        self.save(&record.key(), record)
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// The record stored under `key`, or `None` if there is none or it cannot
    /// be read.
    pub fn load(&self, key: &RecordKey) -> Option<HourlyRecord> {
        let bytes = match self.store.get(&key.to_string()) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                warn!(%key, error = %e, "failed to load record");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(%key, error = %e, "stored record is not valid JSON");
                None
            }
        }
    }

    /// Every record of `date`, checking hours 0 through 23 in order.
    pub fn load_day(&self, date: NaiveDate) -> Vec<HourlyRecord> {
        RecordKey::hours_of(date)
            .filter_map(|key| self.load(&key))
            .collect()
    }

    /// Records of every date from `start` to `end` inclusive, day by day.
    ///
    /// Empty when `start > end`.
    pub fn load_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<HourlyRecord> {
        let records: Vec<HourlyRecord> = dates_between(start, end)
            .flat_map(|date| self.load_day(date))
            .collect();
        debug!(%start, %end, records = records.len(), "range loaded");
        records
    }

    /// Dates that have at least one stored record, ascending.
    ///
    /// Keys that do not start with a valid `YYYY-MM-DD_` date are ignored.
    pub fn list_available_dates(&self) -> Vec<NaiveDate> {
        let keys = match self.store.list_prefix("") {
            Ok(keys) => keys,
            Err(e) => {
                warn!(error = %e, "failed to list stored records");
                return Vec::new();
            }
        };

        let dates: BTreeSet<NaiveDate> = keys
            .iter()
            .filter_map(|key| {
                let (date, _hour) = key.split_once('_')?;
                parse_date(date).ok()
            })
            .collect();
        dates.into_iter().collect()
    }

    /// Hours of `date` whose record loads, ascending.
    ///
    /// Keys [`RecordStore::load_day`] would never look up (such as a
    /// zero-padded hour) and records that fail to decode are left out.
    pub fn hours_with_data(&self, date: NaiveDate) -> Vec<u8> {
        let keys = match self.store.list_prefix(&RecordKey::day_prefix(date)) {
            Ok(keys) => keys,
            Err(e) => {
                warn!(%date, error = %e, "failed to list stored hours");
                return Vec::new();
            }
        };

        let hours: BTreeSet<u8> = keys
            .iter()
            .filter_map(|raw| {
                let key = raw.parse::<RecordKey>().ok()?;
                (key.date == date && key.to_string() == *raw).then_some(key)
            })
            .filter(|key| self.load(key).is_some())
            .map(|key| key.hour)
            .collect();
        hours.into_iter().collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
