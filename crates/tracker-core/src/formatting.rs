//! Text formatting for report output.

use crate::catalog::MachineType;

/// Format a number with thousands separators and a fixed number of decimal
/// places.
///
/// # Examples
///
/// ```
/// use tracker_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(450.0, 0), "450");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let rendered = format!("{:.prec$}", value.abs(), prec = decimals as usize);

    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rendered.as_str(), None),
    };

    let mut out = String::with_capacity(rendered.len() + rendered.len() / 3 + 1);
    if negative && rendered.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a utilization percentage with one decimal place.
///
/// ```
/// use tracker_core::formatting::format_percent;
///
/// assert_eq!(format_percent(50.0), "50.0%");
/// assert_eq!(format_percent(66.666), "66.7%");
/// ```
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}

/// Hour slot label, e.g. `8` → `"8:00"`.
pub fn format_hour(hour: u8) -> String {
    format!("{hour}:00")
}

/// Machine type label; out-of-range machines show as `"Unknown"`.
pub fn machine_type_label(machine_type: Option<MachineType>) -> &'static str {
    machine_type.map_or("Unknown", |t| t.as_str())
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut result = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
