use crate::error::{Result, TrackerError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ── Shared constants ──────────────────────────────────────────────────────────

/// Lowest machine number on the packing line.
pub const FIRST_MACHINE: u32 = 9;

/// Highest machine number on the packing line.
pub const LAST_MACHINE: u32 = 20;

/// Rated capacity of every Jumble Filler, whatever the carton.
pub const JUMBLE_FILLER_CAPACITY: u32 = 210;

/// Capacity reported when a machine/carton combination is not in the table.
pub const UNKNOWN_CAPACITY: u32 = 0;

// ── MachineId ─────────────────────────────────────────────────────────────────

/// Machine number as painted on the line.
///
/// Any number can be represented so that stored data naming an unexpected
/// machine still loads; only 9–20 resolve to a type and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MachineId(pub u32);

impl MachineId {
    pub fn number(self) -> u32 {
        self.0
    }

    /// `true` for machines 9–20.
    pub fn is_known(self) -> bool {
        (FIRST_MACHINE..=LAST_MACHINE).contains(&self.0)
    }

    /// The twelve machines on the line, ascending.
    pub fn all() -> impl Iterator<Item = MachineId> {
        (FIRST_MACHINE..=LAST_MACHINE).map(MachineId)
    }

    /// Display and storage name, e.g. `"Machine 9"`.
    pub fn name(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Machine {}", self.0)
    }
}

impl FromStr for MachineId {
    type Err = TrackerError;

    /// Accepts the storage name (`"Machine 9"`) or a bare number (`"9"`).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("Machine")
            .map(str::trim_start)
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .map(MachineId)
            .map_err(|_| TrackerError::InvalidMachine(s.to_string()))
    }
}

impl Serialize for MachineId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MachineId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

// ── MachineType ───────────────────────────────────────────────────────────────

/// The two physical machine categories on the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineType {
    /// Machines 9–14.
    #[serde(rename = "Speed Packer")]
    SpeedPacker,
    /// Machines 15–20.
    #[serde(rename = "Jumble Filler")]
    JumbleFiller,
}

impl MachineType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineType::SpeedPacker => "Speed Packer",
            MachineType::JumbleFiller => "Jumble Filler",
        }
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── CartonType ────────────────────────────────────────────────────────────────

/// Product packaging code; drives rated throughput on Speed Packers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartonType {
    A02D,
    A07D,
    E10D,
    A11D,
    E15D,
    A15C,
}

impl CartonType {
    /// Every carton code in entry-form order.
    pub const ALL: [CartonType; 6] = [
        CartonType::A02D,
        CartonType::A07D,
        CartonType::E10D,
        CartonType::A11D,
        CartonType::E15D,
        CartonType::A15C,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CartonType::A02D => "A02D",
            CartonType::A07D => "A07D",
            CartonType::E10D => "E10D",
            CartonType::A11D => "A11D",
            CartonType::E15D => "E15D",
            CartonType::A15C => "A15C",
        }
    }
}

impl FromStr for CartonType {
    type Err = TrackerError;

    /// Case-insensitive lookup of a carton code.
    fn from_str(value: &str) -> Result<Self> {
        let upper = value.trim().to_uppercase();
        CartonType::ALL
            .into_iter()
            .find(|carton| carton.as_str() == upper)
            .ok_or_else(|| TrackerError::UnknownCarton(value.to_string()))
    }
}

impl fmt::Display for CartonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Capacity table ────────────────────────────────────────────────────────────

/// Capacity tier a machine number falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapacityTier {
    /// Speed Packers 9–10.
    CompactPacker,
    /// Speed Packers 11–14.
    HighSpeedPacker,
    /// Jumble Fillers 15–20.
    JumbleFiller,
}

impl CapacityTier {
    fn of(machine: MachineId) -> Option<Self> {
        match machine.0 {
            9..=10 => Some(CapacityTier::CompactPacker),
            11..=14 => Some(CapacityTier::HighSpeedPacker),
            15..=20 => Some(CapacityTier::JumbleFiller),
            _ => None,
        }
    }

    /// Packs per hour for `carton` on this tier.
    fn rated(self, carton: CartonType) -> u32 {
        use CartonType::*;
        match (self, carton) {
            (CapacityTier::CompactPacker, A02D | A07D | A11D | E15D) => 300,
            (CapacityTier::CompactPacker, E10D) => 200,
            (CapacityTier::CompactPacker, A15C) => 216,
            (CapacityTier::HighSpeedPacker, A02D | A07D | A11D | E15D) => 360,
            (CapacityTier::HighSpeedPacker, E10D) => 240,
            (CapacityTier::HighSpeedPacker, A15C) => 264,
            (CapacityTier::JumbleFiller, _) => JUMBLE_FILLER_CAPACITY,
        }
    }
}

// ── MachineCatalog ────────────────────────────────────────────────────────────

/// Static registry of machine types and rated capacities.
pub struct MachineCatalog;

impl MachineCatalog {
    /// Machine type for `machine`, or `None` outside 9–20.
    pub fn classify(machine: MachineId) -> Option<MachineType> {
        match machine.0 {
            9..=14 => Some(MachineType::SpeedPacker),
            15..=20 => Some(MachineType::JumbleFiller),
            _ => None,
        }
    }

    /// Rated packs per hour, or `None` when the machine is not on the line.
    ///
    /// Unlike [`MachineCatalog::capacity_of`] this keeps "no such machine"
    /// apart from a real capacity value.
    pub fn lookup_capacity(machine: MachineId, carton: CartonType) -> Option<u32> {
        CapacityTier::of(machine).map(|tier| tier.rated(carton))
    }

    /// Rated packs per hour, [`UNKNOWN_CAPACITY`] (0) when unmapped.
    ///
    /// A zero capacity forces utilization to zero downstream.
    pub fn capacity_of(machine: MachineId, carton: CartonType) -> u32 {
        Self::lookup_capacity(machine, carton).unwrap_or(UNKNOWN_CAPACITY)
    }

    /// Same as [`MachineCatalog::capacity_of`] for a raw carton code.
    ///
    /// Unknown codes yield 0 except on Jumble Fillers, which ignore the
    /// carton entirely.
    pub fn capacity_of_code(machine: MachineId, code: &str) -> u32 {
        match (CapacityTier::of(machine), code.parse::<CartonType>()) {
            (Some(CapacityTier::JumbleFiller), _) => JUMBLE_FILLER_CAPACITY,
            (Some(tier), Ok(carton)) => tier.rated(carton),
            _ => UNKNOWN_CAPACITY,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
