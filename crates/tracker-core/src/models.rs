use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::calculations::MetricCalculator;
use crate::catalog::{CartonType, MachineCatalog, MachineId};
use crate::error::{Result, TrackerError};
use crate::time_utils::RecordKey;

// ── InventoryStatus ───────────────────────────────────────────────────────────

/// Packaging-material readiness at a machine when the reading was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InventoryStatus {
    Wrapped,
    Labelled,
    #[serde(rename = "Wrapped and Labelled")]
    WrappedAndLabelled,
    Unlabelled,
    Other,
}

impl InventoryStatus {
    /// Every category in report order.
    pub const ALL: [InventoryStatus; 5] = [
        InventoryStatus::Wrapped,
        InventoryStatus::Labelled,
        InventoryStatus::WrappedAndLabelled,
        InventoryStatus::Unlabelled,
        InventoryStatus::Other,
    ];

    /// Stored and displayed spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Wrapped => "Wrapped",
            InventoryStatus::Labelled => "Labelled",
            InventoryStatus::WrappedAndLabelled => "Wrapped and Labelled",
            InventoryStatus::Unlabelled => "Unlabelled",
            InventoryStatus::Other => "Other",
        }
    }
}

impl FromStr for InventoryStatus {
    type Err = TrackerError;

    /// Case-insensitive. Also accepts compact spellings such as
    /// `"wrapped-and-labelled"` so the value can be typed on a command line.
    fn from_str(value: &str) -> Result<Self> {
        let normalised: String = value
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        InventoryStatus::ALL
            .into_iter()
            .find(|status| status.as_str().to_lowercase().replace(' ', "") == normalised)
            .ok_or_else(|| TrackerError::UnknownInventory(value.to_string()))
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── MachineReading ────────────────────────────────────────────────────────────

/// One machine's observation for one hour.
///
/// The derived fields are computed once at entry time and stored alongside
/// the raw counts; a resubmitted hour replaces the reading wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineReading {
    pub carton_type: CartonType,
    /// Number of packers working the machine.
    #[serde(rename = "packers")]
    pub packer_count: u32,
    pub cartons_packed: u32,
    #[serde(rename = "inventory")]
    pub inventory_status: InventoryStatus,
    /// Rated packs per hour; 0 when the machine/carton pair is unmapped.
    pub capacity: u32,
    /// Percentage of capacity, 0–100.
    pub utilization: f64,
    pub cartons_per_packer: f64,
}

impl MachineReading {
    /// Build a reading from raw counts, deriving capacity, utilization and
    /// cartons-per-packer.
    pub fn new(
        machine: MachineId,
        carton_type: CartonType,
        packer_count: u32,
        cartons_packed: u32,
        inventory_status: InventoryStatus,
    ) -> Self {
        let capacity = MachineCatalog::capacity_of(machine, carton_type);
        Self {
            carton_type,
            packer_count,
            cartons_packed,
            inventory_status,
            capacity,
            utilization: MetricCalculator::utilization(cartons_packed, capacity),
            cartons_per_packer: MetricCalculator::cartons_per_packer(cartons_packed, packer_count),
        }
    }

    pub fn is_below_target(&self) -> bool {
        MetricCalculator::is_below_target(self.utilization)
    }

    pub fn is_low_throughput(&self) -> bool {
        MetricCalculator::is_low_throughput(self.cartons_per_packer, self.packer_count)
    }
}

// ── HourlyRecord ──────────────────────────────────────────────────────────────

/// Everything recorded for one `(date, hour)` slot; the unit of persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyRecord {
    /// Storage key, `"{date}_{hour}"`.
    pub timestamp: String,
    pub date: NaiveDate,
    pub hour: u8,
    /// Who entered the readings.
    #[serde(rename = "username")]
    pub recorded_by: String,
    /// Readings keyed by machine; serialized as `"Machine {n}"`.
    #[serde(default)]
    pub machines: BTreeMap<MachineId, MachineReading>,
}

impl HourlyRecord {
    /// Empty record for `key`, to be filled with readings.
    pub fn new(key: RecordKey, recorded_by: impl Into<String>) -> Self {
        Self {
            timestamp: key.to_string(),
            date: key.date,
            hour: key.hour,
            recorded_by: recorded_by.into(),
            machines: BTreeMap::new(),
        }
    }

    /// The `(date, hour)` this record belongs to.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            date: self.date,
            hour: self.hour,
        }
    }

    /// Insert or replace the reading for `machine`.
    pub fn insert_reading(&mut self, machine: MachineId, reading: MachineReading) {
        self.machines.insert(machine, reading);
    }

    pub fn reading(&self, machine: MachineId) -> Option<&MachineReading> {
        self.machines.get(&machine)
    }

    /// Builder-style variant of [`HourlyRecord::insert_reading`].
    pub fn with_reading(mut self, machine: MachineId, reading: MachineReading) -> Self {
        self.insert_reading(machine, reading);
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::parse_date;
    use serde_json::json;

    fn key(date: &str, hour: u8) -> RecordKey {
        RecordKey::new(parse_date(date).unwrap(), hour).unwrap()
    }

    #[test]
    fn test_reading_derives_metrics() {
        let r = MachineReading::new(
            MachineId(9),
            CartonType::A02D,
            5,
            150,
            InventoryStatus::Wrapped,
        );
        assert_eq!(r.capacity, 300);
        assert!((r.utilization - 50.0).abs() < 1e-9);
        assert_eq!(r.cartons_per_packer, 30.0);
    }

    #[test]
    fn test_reading_unknown_machine_has_zero_utilization() {
        let r = MachineReading::new(
            MachineId(25),
            CartonType::A02D,
            2,
            300,
            InventoryStatus::Other,
        );
        assert_eq!(r.capacity, 0);
        assert_eq!(r.utilization, 0.0);
        assert_eq!(r.cartons_per_packer, 150.0);
    }

    #[test]
    fn test_reading_flags() {
        let r = MachineReading::new(
            MachineId(11),
            CartonType::A02D,
            20,
            180,
            InventoryStatus::Labelled,
        );
        assert!(r.is_below_target()); // 50 %
        assert!(r.is_low_throughput()); // 9 per packer
    }

    #[test]
    fn test_inventory_status_parse() {
        assert_eq!(
            "Wrapped and Labelled".parse::<InventoryStatus>().unwrap(),
            InventoryStatus::WrappedAndLabelled
        );
        assert_eq!(
            "wrapped-and-labelled".parse::<InventoryStatus>().unwrap(),
            InventoryStatus::WrappedAndLabelled
        );
        assert_eq!(
            "UNLABELLED".parse::<InventoryStatus>().unwrap(),
            InventoryStatus::Unlabelled
        );
        assert!("Shrink wrapped".parse::<InventoryStatus>().is_err());
    }

    #[test]
    fn test_new_record_sets_timestamp_from_key() {
        let record = HourlyRecord::new(key("2025-01-10", 8), "sam");
        assert_eq!(record.timestamp, "2025-01-10_8");
        assert_eq!(record.hour, 8);
        assert_eq!(record.key(), key("2025-01-10", 8));
        assert!(record.machines.is_empty());
    }

    #[test]
    fn test_record_wire_field_names() {
        let record = HourlyRecord::new(key("2025-01-10", 8), "sam").with_reading(
            MachineId(9),
            MachineReading::new(
                MachineId(9),
                CartonType::A02D,
                5,
                150,
                InventoryStatus::WrappedAndLabelled,
            ),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "timestamp": "2025-01-10_8",
                "date": "2025-01-10",
                "hour": 8,
                "username": "sam",
                "machines": {
                    "Machine 9": {
                        "carton_type": "A02D",
                        "packers": 5,
                        "cartons_packed": 150,
                        "inventory": "Wrapped and Labelled",
                        "capacity": 300,
                        "utilization": 50.0,
                        "cartons_per_packer": 30.0
                    }
                }
            })
        );
    }

    #[test]
    fn test_record_reads_legacy_integer_metrics() {
        // Unmapped capacity used to be written as bare integers.
        let raw = r#"{
            "timestamp": "2025-01-10_3",
            "date": "2025-01-10",
            "hour": 3,
            "username": "night shift",
            "machines": {
                "Machine 10": {
                    "carton_type": "E10D",
                    "packers": 0,
                    "cartons_packed": 0,
                    "inventory": "Other",
                    "capacity": 200,
                    "utilization": 0,
                    "cartons_per_packer": 0
                }
            }
        }"#;
        let record: HourlyRecord = serde_json::from_str(raw).unwrap();
        let reading = record.reading(MachineId(10)).unwrap();
        assert_eq!(reading.utilization, 0.0);
        assert_eq!(reading.cartons_per_packer, 0.0);
        assert_eq!(reading.inventory_status, InventoryStatus::Other);
        assert_eq!(record.recorded_by, "night shift");
    }

    #[test]
    fn test_machines_ordered_numerically() {
        let mut record = HourlyRecord::new(key("2025-01-10", 1), "sam");
        for n in [20, 9, 10] {
            record.insert_reading(
                MachineId(n),
                MachineReading::new(
                    MachineId(n),
                    CartonType::A02D,
                    1,
                    10,
                    InventoryStatus::Wrapped,
                ),
            );
        }
        let order: Vec<u32> = record.machines.keys().map(|m| m.number()).collect();
        assert_eq!(order, vec![9, 10, 20]);
    }

    #[test]
    fn test_insert_reading_replaces() {
        let m = MachineId(15);
        let mut record = HourlyRecord::new(key("2025-01-10", 1), "sam");
        record.insert_reading(
            m,
            MachineReading::new(m, CartonType::A02D, 1, 10, InventoryStatus::Wrapped),
        );
        record.insert_reading(
            m,
            MachineReading::new(m, CartonType::A02D, 2, 105, InventoryStatus::Labelled),
        );
        assert_eq!(record.machines.len(), 1);
        assert_eq!(record.reading(m).unwrap().cartons_packed, 105);
    }
}
