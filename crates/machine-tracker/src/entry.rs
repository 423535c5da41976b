//! Reading entry: parsing and validating raw readings typed on the command
//! line, and assembling them into an [`HourlyRecord`].

use std::collections::BTreeSet;
use std::str::FromStr;

use tracker_core::catalog::{CartonType, MachineCatalog, MachineId, UNKNOWN_CAPACITY};
use tracker_core::error::{Result, TrackerError};
use tracker_core::models::{HourlyRecord, InventoryStatus, MachineReading};
use tracker_core::time_utils::RecordKey;

/// Most packers that can work one machine.
pub const MAX_PACKERS: u32 = 10;

/// One raw reading, `MACHINE:CARTON:PACKERS:CARTONS:INVENTORY`, validated but
/// without derived metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingInput {
    pub machine: MachineId,
    pub carton_type: CartonType,
    pub packer_count: u32,
    pub cartons_packed: u32,
    pub inventory_status: InventoryStatus,
}

impl ReadingInput {
    /// Derive capacity, utilization and cartons-per-packer.
    pub fn to_reading(&self) -> MachineReading {
        MachineReading::new(
            self.machine,
            self.carton_type,
            self.packer_count,
            self.cartons_packed,
            self.inventory_status,
        )
    }
}

impl FromStr for ReadingInput {
    type Err = TrackerError;

    fn from_str(raw: &str) -> Result<Self> {
        let fields: Vec<&str> = raw.split(':').map(str::trim).collect();
        let [machine, carton, packers, cartons, inventory] = fields.as_slice() else {
            return Err(TrackerError::InvalidReading(format!(
                "{raw:?}: expected MACHINE:CARTON:PACKERS:CARTONS:INVENTORY"
            )));
        };

        let machine: MachineId = machine.parse()?;
        if MachineCatalog::capacity_of_code(machine, carton) == UNKNOWN_CAPACITY {
            return Err(if machine.is_known() {
                TrackerError::UnknownCarton(carton.to_string())
            } else {
                TrackerError::InvalidReading(format!("{machine} is not on the packing line"))
            });
        }
        // Jumble Fillers rate every code alike, so the code is still checked.
        let carton_type: CartonType = carton.parse()?;

        let packer_count: u32 = packers.parse().map_err(|_| {
            TrackerError::InvalidReading(format!("packer count {packers:?} is not a number"))
        })?;
        if packer_count > MAX_PACKERS {
            return Err(TrackerError::InvalidReading(format!(
                "{packer_count} packers on {machine}; at most {MAX_PACKERS} allowed"
            )));
        }

        let cartons_packed: u32 = cartons.parse().map_err(|_| {
            TrackerError::InvalidReading(format!("carton count {cartons:?} is not a number"))
        })?;

        Ok(Self {
            machine,
            carton_type,
            packer_count,
            cartons_packed,
            inventory_status: inventory.parse()?,
        })
    }
}

/// Parse every raw reading, rejecting a machine that appears twice.
pub fn parse_readings<S: AsRef<str>>(raw: &[S]) -> Result<Vec<ReadingInput>> {
    let mut seen = BTreeSet::new();
    raw.iter()
        .map(|s| {
            let input: ReadingInput = s.as_ref().parse()?;
            if !seen.insert(input.machine) {
                return Err(TrackerError::InvalidReading(format!(
                    "{} entered more than once",
                    input.machine
                )));
            }
            Ok(input)
        })
        .collect()
}

/// The record for `key` holding exactly `inputs`.
pub fn build_record(key: RecordKey, recorded_by: &str, inputs: &[ReadingInput]) -> HourlyRecord {
    inputs
        .iter()
        .fold(HourlyRecord::new(key, recorded_by), |record, input| {
            record.with_reading(input.machine, input.to_reading())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_core::time_utils::parse_date;

    #[test]
    fn test_parse_reading() {
        let input: ReadingInput = "9:A02D:3:150:wrapped".parse().unwrap();
        assert_eq!(
            input,
            ReadingInput {
                machine: MachineId(9),
                carton_type: CartonType::A02D,
                packer_count: 3,
                cartons_packed: 150,
                inventory_status: InventoryStatus::Wrapped,
            }
        );
    }

    #[test]
    fn test_parse_reading_accepts_machine_name_and_spaces() {
        let input: ReadingInput = "Machine 17 : e15d : 0 : 42 : Wrapped and Labelled"
            .parse()
            .unwrap();
        assert_eq!(input.machine, MachineId(17));
        assert_eq!(input.carton_type, CartonType::E15D);
        assert_eq!(input.inventory_status, InventoryStatus::WrappedAndLabelled);
    }

    #[test]
    fn test_parse_reading_rejects_bad_shape() {
        for raw in ["", "9:A02D:3:150", "9:A02D:3:150:wrapped:extra"] {
            assert!(
                matches!(raw.parse::<ReadingInput>(), Err(TrackerError::InvalidReading(_))),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_parse_reading_rejects_machine_off_the_line() {
        assert!(matches!(
            "21:A02D:3:150:wrapped".parse::<ReadingInput>(),
            Err(TrackerError::InvalidReading(_))
        ));
        assert!("8:A02D:3:150:wrapped".parse::<ReadingInput>().is_err());
    }

    #[test]
    fn test_parse_reading_rejects_unknown_codes() {
        assert!(matches!(
            "9:Z99Z:3:150:wrapped".parse::<ReadingInput>(),
            Err(TrackerError::UnknownCarton(_))
        ));
        assert!(matches!(
            "9:A02D:3:150:shrunk".parse::<ReadingInput>(),
            Err(TrackerError::UnknownInventory(_))
        ));
    }

    #[test]
    fn test_parse_reading_checks_code_on_every_machine_type() {
        assert!(matches!(
            "12:Z99Z:3:150:wrapped".parse::<ReadingInput>(),
            Err(TrackerError::UnknownCarton(code)) if code == "Z99Z"
        ));
        assert!(matches!(
            "18:Z99Z:0:150:wrapped".parse::<ReadingInput>(),
            Err(TrackerError::UnknownCarton(_))
        ));
        // Off-line machines report the machine, not the code.
        assert!(matches!(
            "30:Z99Z:3:150:wrapped".parse::<ReadingInput>(),
            Err(TrackerError::InvalidReading(_))
        ));

        let input: ReadingInput = "12:a15c:3:132:wrapped".parse().unwrap();
        assert_eq!(input.carton_type, CartonType::A15C);
        assert_eq!(input.to_reading().capacity, 264);
    }

    #[test]
    fn test_parse_reading_packer_bounds() {
        assert!("9:A02D:10:150:wrapped".parse::<ReadingInput>().is_ok());
        assert!("9:A02D:11:150:wrapped".parse::<ReadingInput>().is_err());
        assert!("9:A02D:-1:150:wrapped".parse::<ReadingInput>().is_err());
        assert!("9:A02D:3:lots:wrapped".parse::<ReadingInput>().is_err());
    }

    #[test]
    fn test_parse_readings_rejects_duplicate_machine() {
        let err = parse_readings(&["9:A02D:3:150:wrapped", "Machine 9:A07D:2:100:other"])
            .unwrap_err();
        assert!(err.to_string().contains("Machine 9"));
    }

    #[test]
    fn test_build_record_derives_metrics() {
        let key = RecordKey::new(parse_date("2025-01-10").unwrap(), 8).unwrap();
        let inputs = parse_readings(&["9:A02D:5:150:wrapped", "11:E10D:0:480:other"]).unwrap();
        let record = build_record(key, "sam", &inputs);

        assert_eq!(record.timestamp, "2025-01-10_8");
        assert_eq!(record.recorded_by, "sam");

        let m9 = record.reading(MachineId(9)).unwrap();
        assert_eq!(m9.capacity, 300);
        assert_eq!(m9.utilization, 50.0);
        assert_eq!(m9.cartons_per_packer, 30.0);

        let m11 = record.reading(MachineId(11)).unwrap();
        assert_eq!(m11.capacity, 240);
        assert_eq!(m11.utilization, 100.0);
        assert_eq!(m11.cartons_per_packer, 0.0);
    }
}
