//! Text and JSON rendering of records and aggregates.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use chrono::NaiveDate;
use comfy_table::{modifiers, presets, CellAlignment, Table};
use serde::Serialize;
use tracker_core::calculations::UTILIZATION_TARGET;
use tracker_core::catalog::{MachineCatalog, MachineId};
use tracker_core::formatting::{format_hour, format_number, format_percent, machine_type_label};
use tracker_core::models::{HourlyRecord, InventoryStatus};
use tracker_core::stats::Summary;
use tracker_core::time_utils::format_date;
use tracker_data::aggregator::{
    DailyAggregate, HourlyPoint, InventoryTrend, ReportAggregator, TrendPoint,
};

// ── Report payloads ───────────────────────────────────────────────────────────

/// Everything the `day` command shows.
#[derive(Debug, Clone, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub hours_with_data: Vec<u8>,
    pub machines: BTreeMap<MachineId, DailyAggregate>,
    pub hourly_utilization: BTreeMap<MachineId, Vec<HourlyPoint>>,
    pub inventory: BTreeMap<InventoryStatus, Summary>,
}

impl DayReport {
    /// Report over the records that actually loaded for `date`.
    pub fn build(date: NaiveDate, records: &[HourlyRecord]) -> Self {
        let hours: BTreeSet<u8> = records.iter().map(|r| r.hour).collect();
        Self {
            date,
            hours_with_data: hours.into_iter().collect(),
            machines: ReportAggregator::daily_averages(records),
            hourly_utilization: ReportAggregator::hourly_utilization(records),
            inventory: ReportAggregator::inventory_stats(records),
        }
    }
}

/// Everything the `trend` command shows.
#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub utilization: Vec<TrendPoint>,
    pub inventory: InventoryTrend,
}

impl TrendReport {
    pub fn build(start: NaiveDate, end: NaiveDate, records: &[HourlyRecord]) -> Self {
        Self {
            start,
            end,
            utilization: ReportAggregator::trend_series(records, start, end),
            inventory: ReportAggregator::inventory_trend_series(records, start, end),
        }
    }
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// Bordered table with `headers`; every column but the first is right-aligned.
fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(headers.to_vec());
    for column in table.column_iter_mut().skip(1) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    table
}

// ── Text rendering ────────────────────────────────────────────────────────────

/// One hour's readings with per-machine flags and an inventory summary.
pub fn render_record(record: &HourlyRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Date: {} | Hour: {}",
        format_date(record.date),
        format_hour(record.hour)
    );
    let _ = writeln!(out, "Recorded by: {}", record.recorded_by);
    out.push('\n');

    if record.machines.is_empty() {
        out.push_str("No machine readings.\n");
        return out;
    }

    let mut table = new_table(&[
        "Machine",
        "Type",
        "Carton",
        "Packers",
        "Cartons",
        "Util%",
        "Cartons/Packer",
        "Flags",
    ]);
    for (machine, reading) in &record.machines {
        let mut flags = Vec::new();
        if reading.is_below_target() {
            flags.push("below target");
        }
        if reading.is_low_throughput() {
            flags.push("low per packer");
        }
        table.add_row(vec![
            machine.name(),
            machine_type_label(MachineCatalog::classify(*machine)).to_string(),
            reading.carton_type.to_string(),
            reading.packer_count.to_string(),
            format_number(f64::from(reading.cartons_packed), 0),
            format_percent(reading.utilization),
            format_number(reading.cartons_per_packer, 1),
            flags.join(", "),
        ]);
    }
    let _ = writeln!(out, "{table}");

    out.push_str("\nInventory status:\n");
    for (status, count) in ReportAggregator::inventory_counts(record) {
        if count > 0 {
            let _ = writeln!(out, "  {status}: {count} machines");
        }
    }
    out
}

/// Daily machine averages, hourly utilization and inventory impact.
pub fn render_day(report: &DayReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Daily report for {}", format_date(report.date));

    if report.machines.is_empty() {
        out.push_str("No data recorded for this date.\n");
        return out;
    }

    let hours: Vec<String> = report.hours_with_data.iter().map(|h| format_hour(*h)).collect();
    let _ = writeln!(out, "Hours recorded: {}", hours.join(", "));
    out.push('\n');

    let mut table = new_table(&[
        "Machine",
        "Type",
        "Avg Util%",
        "Avg Cartons/Packer",
        "Total Cartons",
        "Hours",
    ]);
    for (machine, agg) in &report.machines {
        table.add_row(vec![
            machine.name(),
            agg.machine_type.to_string(),
            format_percent(agg.avg_utilization),
            format_number(agg.avg_cartons_per_packer, 1),
            format_number(agg.total_cartons as f64, 0),
            agg.data_points.to_string(),
        ]);
    }
    let _ = writeln!(out, "{table}");

    let below: Vec<String> = report
        .machines
        .iter()
        .filter(|(_, agg)| agg.avg_utilization < UTILIZATION_TARGET)
        .map(|(machine, _)| machine.name())
        .collect();
    if !below.is_empty() {
        let _ = writeln!(
            out,
            "Below {} target: {}",
            format_percent(UTILIZATION_TARGET),
            below.join(", ")
        );
    }

    out.push_str("\nHourly utilization:\n");
    for (machine, points) in &report.hourly_utilization {
        let series: Vec<String> = points
            .iter()
            .map(|p| format!("{} {}", format_hour(p.hour), format_percent(p.utilization)))
            .collect();
        let _ = writeln!(out, "  {machine}: {}", series.join(", "));
    }

    out.push('\n');
    out.push_str(&render_inventory_stats(&report.inventory));
    out
}

/// Utilization by inventory status; every status is listed.
pub fn render_inventory_stats(stats: &BTreeMap<InventoryStatus, Summary>) -> String {
    let mut table = new_table(&["Inventory", "Mean Util%", "Median Util%", "Readings"]);
    for (status, summary) in stats {
        table.add_row(vec![
            status.to_string(),
            format_percent(summary.mean),
            format_percent(summary.median),
            summary.count.to_string(),
        ]);
    }
    format!("Inventory impact:\n{table}\n")
}

/// Day-by-day average utilization and the per-inventory breakdown.
pub fn render_trend(report: &TrendReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Utilization trend {} to {}",
        format_date(report.start),
        format_date(report.end)
    );

    if report.utilization.is_empty() {
        out.push_str("Insufficient data for the selected range.\n");
        return out;
    }
    out.push('\n');

    let mut table = new_table(&["Date", "Avg Util%", "Readings", ""]);
    for point in &report.utilization {
        let marker = if point.avg_utilization < UTILIZATION_TARGET {
            "below target"
        } else {
            ""
        };
        table.add_row(vec![
            format_date(point.date),
            format_percent(point.avg_utilization),
            point.data_points.to_string(),
            marker.to_string(),
        ]);
    }
    let _ = writeln!(out, "{table}");

    out.push_str("\nInventory impact over time:\n");
    let mut headers = vec!["Date"];
    headers.extend(InventoryStatus::ALL.iter().map(|s| s.as_str()));
    let mut inventory = new_table(&headers);
    for (i, date) in report.inventory.dates.iter().enumerate() {
        let mut row = vec![format_date(*date)];
        for status in InventoryStatus::ALL {
            let cell = report
                .inventory
                .series
                .get(&status)
                .and_then(|values| values.get(i).copied().flatten())
                .map(format_percent)
                .unwrap_or_else(|| "-".to_string());
            row.push(cell);
        }
        inventory.add_row(row);
    }
    let _ = writeln!(out, "{inventory}");
    out
}

/// One date per line, ascending.
pub fn render_dates(dates: &[NaiveDate]) -> String {
    if dates.is_empty() {
        return "No data recorded yet.\n".to_string();
    }
    dates.iter().map(|d| format!("{}\n", format_date(*d))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::catalog::CartonType;
    use tracker_core::models::MachineReading;
    use tracker_core::time_utils::{parse_date, RecordKey};
    use tracker_data::records::RecordStore;
    use tracker_data::store::{KeyValueStore, MemoryStore};

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn record(hour: u8, readings: &[(u32, u32, u32, InventoryStatus)]) -> HourlyRecord {
        let mut r = HourlyRecord::new(RecordKey::new(date("2025-01-10"), hour).unwrap(), "sam");
        for (machine, packers, cartons, inventory) in readings {
            let m = MachineId(*machine);
            r.insert_reading(
                m,
                MachineReading::new(m, CartonType::A02D, *packers, *cartons, *inventory),
            );
        }
        r
    }

    fn row_with<'a>(text: &'a str, needle: &str) -> &'a str {
        text.lines()
            .find(|l| l.contains(needle))
            .unwrap_or_else(|| panic!("no line containing {needle:?} in\n{text}"))
    }

    fn cells(line: &str) -> Vec<&str> {
        line.split(['│', '┆'])
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect()
    }

    #[test]
    fn test_table_right_aligns_value_columns() {
        let mut table = new_table(&["Name", "Value"]);
        table.add_row(vec!["a", "1"]);
        table.add_row(vec!["longer", "1,000"]);
        let text = table.to_string();

        assert_eq!(cells(row_with(&text, "Name")), vec!["Name", "Value"]);
        assert_eq!(cells(row_with(&text, "longer")), vec!["longer", "1,000"]);
        // The short value is padded on the left to line up with "1,000".
        let short = row_with(&text, " a ");
        assert!(short.contains("     1 "), "{short:?}");
    }

    #[test]
    fn test_render_record_flags_and_inventory() {
        let r = record(
            8,
            &[
                (9, 5, 150, InventoryStatus::Wrapped),
                (15, 2, 210, InventoryStatus::Wrapped),
                (10, 0, 0, InventoryStatus::Other),
            ],
        );
        let text = render_record(&r);

        assert!(text.starts_with("Date: 2025-01-10 | Hour: 8:00\nRecorded by: sam\n"));
        let m9 = cells(row_with(&text, "Machine 9 "));
        assert_eq!(
            m9,
            vec!["Machine 9", "Speed Packer", "A02D", "5", "150", "50.0%", "30.0", "below target"]
        );

        let m15 = cells(row_with(&text, "Machine 15"));
        assert_eq!(m15[1], "Jumble Filler");
        assert_eq!(m15[5], "100.0%");
        assert_eq!(m15.len(), 7, "no flags expected: {m15:?}");

        assert!(text.contains("  Wrapped: 2 machines\n"));
        assert!(text.contains("  Other: 1 machines\n"));
        assert!(!text.contains("Labelled:"));
    }

    #[test]
    fn test_render_record_without_readings() {
        let text = render_record(&record(3, &[]));
        assert!(text.contains("No machine readings."));
    }

    #[test]
    fn test_render_day() {
        let records = vec![
            record(8, &[(9, 5, 150, InventoryStatus::Wrapped)]),
            record(9, &[(9, 5, 300, InventoryStatus::Labelled)]),
        ];
        let report = DayReport::build(date("2025-01-10"), &records);
        let text = render_day(&report);

        assert!(text.contains("Hours recorded: 8:00, 9:00"));
        let m9 = cells(row_with(&text, "Machine 9 "));
        assert_eq!(m9, vec!["Machine 9", "Speed Packer", "75.0%", "45.0", "450", "2"]);
        assert!(text.contains("Machine 9: 8:00 50.0%, 9:00 100.0%"));
        assert!(text.contains("Inventory impact:"));
        assert_eq!(
            cells(row_with(&text, "Unlabelled")),
            vec!["Unlabelled", "0.0%", "0.0%", "0"]
        );
    }

    #[test]
    fn test_day_report_hours_come_from_loaded_records() {
        let backend = MemoryStore::new();
        backend.put("2025-01-10_8", b"{ corrupt").unwrap();
        let store = RecordStore::new(backend);
        store
            .save_record(&record(14, &[(9, 5, 150, InventoryStatus::Wrapped)]))
            .unwrap();
        store
            .save_record(&record(6, &[(9, 5, 300, InventoryStatus::Wrapped)]))
            .unwrap();

        let report = DayReport::build(date("2025-01-10"), &store.load_day(date("2025-01-10")));
        assert_eq!(report.hours_with_data, vec![6, 14]);
        assert!(render_day(&report).contains("Hours recorded: 6:00, 14:00\n"));
    }

    #[test]
    fn test_render_day_empty() {
        let report = DayReport::build(date("2025-01-10"), &[]);
        assert!(render_day(&report).contains("No data recorded for this date."));
    }

    #[test]
    fn test_render_trend() {
        let records = vec![record(8, &[(9, 5, 150, InventoryStatus::Wrapped)])];
        let report = TrendReport::build(date("2025-01-09"), date("2025-01-10"), &records);
        let text = render_trend(&report);

        let rows: Vec<Vec<&str>> = text
            .lines()
            .filter(|l| l.contains("2025-01-10") && !l.starts_with("Utilization"))
            .map(cells)
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec!["2025-01-10", "50.0%", "1", "below target"]);
        // Statuses with no readings that day show a dash.
        assert_eq!(rows[1], vec!["2025-01-10", "50.0%", "-", "-", "-", "-"]);
        assert!(!text.lines().any(|l| l.contains("2025-01-09") && l.contains('│')));
    }

    #[test]
    fn test_render_trend_without_data() {
        let report = TrendReport::build(date("2025-01-09"), date("2025-01-10"), &[]);
        assert!(render_trend(&report).contains("Insufficient data"));
    }

    #[test]
    fn test_render_dates() {
        assert_eq!(
            render_dates(&[date("2025-01-10"), date("2025-01-12")]),
            "2025-01-10\n2025-01-12\n"
        );
        assert_eq!(render_dates(&[]), "No data recorded yet.\n");
    }

    #[test]
    fn test_day_report_json_shape() {
        let records = vec![record(8, &[(9, 5, 150, InventoryStatus::Wrapped)])];
        let report = DayReport::build(date("2025-01-10"), &records);
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["date"], "2025-01-10");
        assert_eq!(value["machines"]["Machine 9"]["avg_utilization"], 50.0);
        assert_eq!(value["hourly_utilization"]["Machine 9"][0]["hour"], 8);
        assert_eq!(value["inventory"]["Other"]["count"], 0);
    }
}
