//! Character-count capacity estimate.
//!
//! Four characters per unit is a coarse stand-in for natural-language token
//! density. It is approximate by nature; no tokenizer is involved.

pub const CHARS_PER_UNIT: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Estimate {
    pub units: u64,
    /// Share of the capacity limit, always within 0..=100.
    pub percentage: u8,
}

/// Units for a text of `length` characters.
pub fn units_for(length: usize) -> u64 {
    (length as f64 / CHARS_PER_UNIT).round() as u64
}

/// Percentage of `limit` consumed by `units`. A non-positive limit reads
/// as 0 %.
pub fn percentage_of(units: u64, limit: i64) -> u8 {
    if limit <= 0 {
        return 0;
    }
    let pct = (units as f64 / limit as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

pub fn estimate(length: usize, limit: i64) -> Estimate {
    let units = units_for(length);
    Estimate {
        units,
        percentage: percentage_of(units, limit),
    }
}
