// ── Thresholds ────────────────────────────────────────────────────────────────

/// Utilization (%) below which a machine-hour is flagged as under target.
pub const UTILIZATION_TARGET: f64 = 70.0;

/// Cartons per packer below which a staffed machine-hour is flagged.
pub const MIN_CARTONS_PER_PACKER: f64 = 11.0;

/// Utilization ceiling; over-capacity output reports as fully utilized.
pub const MAX_UTILIZATION: f64 = 100.0;

// ── MetricCalculator ──────────────────────────────────────────────────────────

/// Stateless collection of per-reading metric calculations.
///
/// Every function is total: inputs are validated by the entry layer before
/// they reach here.
pub struct MetricCalculator;

impl MetricCalculator {
    /// Cartons packed as a percentage of rated capacity, capped at 100.
    ///
    /// A capacity of 0 means "capacity unknown" and yields 0.
    pub fn utilization(cartons_packed: u32, capacity: u32) -> f64 {
        if capacity == 0 {
            return 0.0;
        }
        let raw = f64::from(cartons_packed) / f64::from(capacity) * 100.0;
        raw.min(MAX_UTILIZATION)
    }

    /// Throughput per packer, 0 when nobody was packing.
    pub fn cartons_per_packer(cartons_packed: u32, packer_count: u32) -> f64 {
        if packer_count == 0 {
            return 0.0;
        }
        f64::from(cartons_packed) / f64::from(packer_count)
    }

    /// `true` when utilization is below [`UTILIZATION_TARGET`].
    pub fn is_below_target(utilization: f64) -> bool {
        utilization < UTILIZATION_TARGET
    }

    /// `true` when a staffed machine packs fewer than
    /// [`MIN_CARTONS_PER_PACKER`] cartons per packer.
    pub fn is_low_throughput(cartons_per_packer: f64, packer_count: u32) -> bool {
        packer_count > 0 && cartons_per_packer < MIN_CARTONS_PER_PACKER
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
