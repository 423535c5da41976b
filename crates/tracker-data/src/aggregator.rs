//! Report aggregation over loaded hourly records.
//!
//! Everything here is recomputed from the records passed in; nothing is
//! cached or written back.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracker_core::catalog::{MachineCatalog, MachineId, MachineType};
use tracker_core::models::{HourlyRecord, InventoryStatus};
use tracker_core::stats::Summary;
use tracker_core::time_utils::dates_between;

// ── DailyAggregate ────────────────────────────────────────────────────────────

/// One machine's figures over a single date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub machine_type: MachineType,
    pub avg_utilization: f64,
    /// Averaged over every hour with a reading, including hours with no
    /// packers.
    pub avg_cartons_per_packer: f64,
    pub total_cartons: u64,
    /// Hours that carried a reading for this machine.
    pub data_points: u32,
}

#[derive(Debug, Default)]
struct MachineTotals {
    utilization: f64,
    cartons_per_packer: f64,
    cartons: u64,
    data_points: u32,
}

// ── TrendPoint ────────────────────────────────────────────────────────────────

/// Mean utilization across every machine-hour of one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub avg_utilization: f64,
    pub data_points: u32,
}

// ── InventoryTrend ────────────────────────────────────────────────────────────

/// Per-date mean utilization split by inventory status.
///
/// `series[status][i]` belongs to `dates[i]` and is `None` when no machine
/// reported that status on that date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryTrend {
    pub dates: Vec<NaiveDate>,
    pub series: BTreeMap<InventoryStatus, Vec<Option<f64>>>,
}

impl InventoryTrend {
    /// The plottable points of one status, absent values dropped.
    pub fn points(&self, status: InventoryStatus) -> Vec<(NaiveDate, f64)> {
        let Some(values) = self.series.get(&status) else {
            return Vec::new();
        };
        self.dates
            .iter()
            .zip(values)
            .filter_map(|(date, value)| value.map(|v| (*date, v)))
            .collect()
    }
}

// ── HourlyPoint ───────────────────────────────────────────────────────────────

/// One machine's utilization at one hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: u8,
    pub utilization: f64,
}

// ── ReportAggregator ──────────────────────────────────────────────────────────

/// Stateless helper that turns hourly records into report figures.
pub struct ReportAggregator;

impl ReportAggregator {
    /// Per-machine averages over `records`, normally one day's worth.
    ///
    /// Machines without a single reading are left out.
    pub fn daily_averages(records: &[HourlyRecord]) -> BTreeMap<MachineId, DailyAggregate> {
        let mut totals: BTreeMap<MachineId, MachineTotals> = BTreeMap::new();

        for record in records {
            for machine in MachineId::all() {
                let Some(reading) = record.reading(machine) else {
                    continue;
                };
                let entry = totals.entry(machine).or_default();
                entry.utilization += reading.utilization;
                if reading.packer_count > 0 {
                    entry.cartons_per_packer += reading.cartons_per_packer;
                }
                entry.cartons += u64::from(reading.cartons_packed);
                entry.data_points += 1;
            }
        }

        totals
            .into_iter()
            .filter_map(|(machine, t)| {
                let machine_type = MachineCatalog::classify(machine)?;
                let n = f64::from(t.data_points);
                Some((
                    machine,
                    DailyAggregate {
                        machine_type,
                        avg_utilization: t.utilization / n,
                        avg_cartons_per_packer: t.cartons_per_packer / n,
                        total_cartons: t.cartons,
                        data_points: t.data_points,
                    },
                ))
            })
            .collect()
    }

    /// Utilization statistics per inventory status, pooling every
    /// machine-hour in `records`.
    ///
    /// Every status is present; an unobserved one summarises to zeros.
    pub fn inventory_stats(records: &[HourlyRecord]) -> BTreeMap<InventoryStatus, Summary> {
        let mut pooled: BTreeMap<InventoryStatus, Vec<f64>> = InventoryStatus::ALL
            .into_iter()
            .map(|status| (status, Vec::new()))
            .collect();

        for reading in records.iter().flat_map(|r| r.machines.values()) {
            pooled
                .entry(reading.inventory_status)
                .or_default()
                .push(reading.utilization);
        }

        pooled
            .into_iter()
            .map(|(status, values)| (status, Summary::of(&values)))
            .collect()
    }

    /// One point per date in `start..=end` that has readings.
    pub fn trend_series(
        records: &[HourlyRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<TrendPoint> {
        let by_date = Self::group_by_date(records);

        dates_between(start, end)
            .filter_map(|date| {
                let day = by_date.get(&date)?;
                let (sum, count) = day
                    .iter()
                    .flat_map(|r| r.machines.values())
                    .fold((0.0, 0u32), |(sum, count), reading| {
                        (sum + reading.utilization, count + 1)
                    });
                if count == 0 {
                    return None;
                }
                Some(TrendPoint {
                    date,
                    avg_utilization: sum / f64::from(count),
                    data_points: count,
                })
            })
            .collect()
    }

    /// Mean utilization per inventory status for each date in `start..=end`
    /// that has at least one record.
    pub fn inventory_trend_series(
        records: &[HourlyRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> InventoryTrend {
        let by_date = Self::group_by_date(records);
        let mut trend = InventoryTrend {
            dates: Vec::new(),
            series: InventoryStatus::ALL
                .into_iter()
                .map(|status| (status, Vec::new()))
                .collect(),
        };

        for date in dates_between(start, end) {
            let Some(day) = by_date.get(&date) else {
                continue;
            };
            trend.dates.push(date);

            let mut sums: BTreeMap<InventoryStatus, (f64, u32)> = BTreeMap::new();
            for reading in day.iter().flat_map(|r| r.machines.values()) {
                let (sum, count) = sums.entry(reading.inventory_status).or_default();
                *sum += reading.utilization;
                *count += 1;
            }

            for (status, values) in trend.series.iter_mut() {
                let mean = sums
                    .get(status)
                    .map(|(sum, count)| sum / f64::from(*count));
                values.push(mean);
            }
        }

        trend
    }

    /// Each machine's utilization through the hours of `records`, ascending by
    /// hour. Hours where a machine has no reading are skipped.
    pub fn hourly_utilization(records: &[HourlyRecord]) -> BTreeMap<MachineId, Vec<HourlyPoint>> {
        let mut sorted: Vec<&HourlyRecord> = records.iter().collect();
        sorted.sort_by_key(|r| (r.date, r.hour));

        let mut series: BTreeMap<MachineId, Vec<HourlyPoint>> = BTreeMap::new();
        for record in sorted {
            for (machine, reading) in &record.machines {
                series.entry(*machine).or_default().push(HourlyPoint {
                    hour: record.hour,
                    utilization: reading.utilization,
                });
            }
        }
        series
    }

    /// How many machines reported each inventory status in one record.
    ///
    /// Every status is present, zero when unreported.
    pub fn inventory_counts(record: &HourlyRecord) -> BTreeMap<InventoryStatus, usize> {
        let mut counts: BTreeMap<InventoryStatus, usize> = InventoryStatus::ALL
            .into_iter()
            .map(|status| (status, 0))
            .collect();
        for reading in record.machines.values() {
            *counts.entry(reading.inventory_status).or_default() += 1;
        }
        counts
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn group_by_date(records: &[HourlyRecord]) -> BTreeMap<NaiveDate, Vec<&HourlyRecord>> {
        let mut map: BTreeMap<NaiveDate, Vec<&HourlyRecord>> = BTreeMap::new();
        for record in records {
            map.entry(record.date).or_default().push(record);
        }
        map
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
