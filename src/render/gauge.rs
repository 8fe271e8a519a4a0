//! Estimate → gauge mapping.
//!
//! Pure functions: the same estimate and config always give the same
//! [`GaugeVisualState`]. Coordinates live in the gauge's 180×120 view box
//! with y growing downwards.

use crate::config::{BandMode, GaugeConfig};
use crate::engine::estimator::Estimate;
use crate::render::palette::{self, Rgba};

/// Arc center, shared by the needle pivot and the hub.
pub const CENTER: (f64, f64) = (90.0, 90.0);
pub const ARC_RADIUS: f64 = 80.0;
pub const NEEDLE_LENGTH: f64 = 70.0;

/// Fixed cutoffs used by [`BandMode::Fixed`].
pub const CAUTION_PERCENT: u8 = 50;
pub const DANGER_PERCENT: u8 = 70;

/// Label color band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Neutral,
    Caution,
    Danger,
}

impl Band {
    pub fn color(self) -> Rgba {
        match self {
            Band::Neutral => palette::TEXT,
            Band::Caution => palette::CAUTION,
            Band::Danger => palette::DANGER,
        }
    }
}

/// Everything the renderer writes into the element for one estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeVisualState {
    pub needle_angle_deg: f64,
    pub needle_end: (f64, f64),
    pub display_text: String,
    pub band: Band,
    pub text_color: Rgba,
}

/// 0 % points left (180°), 100 % points right (0°).
pub fn needle_angle(percentage: u8) -> f64 {
    180.0 - f64::from(percentage.min(100)) * 1.8
}

/// Point at `angle_deg` on a circle of `radius` around [`CENTER`].
pub fn point_on_arc(angle_deg: f64, radius: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    (CENTER.0 + radius * rad.cos(), CENTER.1 - radius * rad.sin())
}

pub fn needle_endpoint(angle_deg: f64) -> (f64, f64) {
    point_on_arc(angle_deg, NEEDLE_LENGTH)
}

/// `1000` and above as rounded thousands with a `K` suffix.
pub fn format_units(value: i64) -> String {
    if value >= 1000 {
        format!("{}K", (value as f64 / 1000.0).round() as i64)
    } else {
        value.to_string()
    }
}

pub fn label_text(units: u64, limit: i64, percentage: u8, show_percentage: bool) -> String {
    let count = i64::try_from(units).unwrap_or(i64::MAX);
    let mut text = format!("{} / {}", format_units(count), format_units(limit));
    if show_percentage {
        text.push_str(&format!(" ({}%)", percentage));
    }
    text
}

pub fn band_for(estimate: &Estimate, config: &GaugeConfig) -> Band {
    match config.band_mode {
        BandMode::Fixed => {
            if estimate.percentage >= DANGER_PERCENT {
                Band::Danger
            } else if estimate.percentage >= CAUTION_PERCENT {
                Band::Caution
            } else {
                Band::Neutral
            }
        }
        BandMode::Thresholds => {
            let units = i64::try_from(estimate.units).unwrap_or(i64::MAX);
            if units >= config.caution_threshold {
                Band::Danger
            } else if units >= config.safe_threshold {
                Band::Caution
            } else {
                Band::Neutral
            }
        }
    }
}

pub fn visual_state(estimate: &Estimate, config: &GaugeConfig) -> GaugeVisualState {
    let angle = needle_angle(estimate.percentage);
    let band = band_for(estimate, config);
    GaugeVisualState {
        needle_angle_deg: angle,
        needle_end: needle_endpoint(angle),
        display_text: label_text(
            estimate.units,
            config.effective_limit(),
            estimate.percentage,
            config.show_percentage,
        ),
        band,
        text_color: band.color(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::estimator::estimate;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn needle_sweeps_left_to_right() {
        assert_eq!(needle_angle(0), 180.0);
        assert_eq!(needle_angle(50), 90.0);
        assert_eq!(needle_angle(100), 0.0);
        assert!(close(needle_endpoint(180.0), (20.0, 90.0)));
        assert!(close(needle_endpoint(90.0), (90.0, 20.0)));
        assert!(close(needle_endpoint(0.0), (160.0, 90.0)));
    }

    #[test]
    fn thousands_abbreviation() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(999), "999");
        assert_eq!(format_units(1000), "1K");
        assert_eq!(format_units(1499), "1K");
        assert_eq!(format_units(1500), "2K");
        assert_eq!(format_units(200_000), "200K");
    }

    #[test]
    fn scenario_empty_page() {
        let state = visual_state(&estimate(0, 200_000), &GaugeConfig::default());
        assert_eq!(state.display_text, "0 / 200K (0%)");
        assert_eq!(state.band, Band::Neutral);
        assert_eq!(state.text_color, palette::TEXT);
    }

    #[test]
    fn scenario_half_full_is_caution() {
        let state = visual_state(&estimate(400_000, 200_000), &GaugeConfig::default());
        assert_eq!(state.display_text, "100K / 200K (50%)");
        assert_eq!(state.text_color, palette::CAUTION);
    }

    #[test]
    fn scenario_three_quarters_is_danger() {
        let state = visual_state(&estimate(600_000, 200_000), &GaugeConfig::default());
        assert_eq!(state.display_text, "150K / 200K (75%)");
        assert_eq!(state.text_color, palette::DANGER);
    }

    #[test]
    fn scenario_overflow_clamps() {
        let state = visual_state(&estimate(1_000_000, 200_000), &GaugeConfig::default());
        assert_eq!(state.display_text, "250K / 200K (100%)");
        assert_eq!(state.needle_angle_deg, 0.0);
    }

    #[test]
    fn percentage_suffix_is_optional() {
        let config = GaugeConfig {
            show_percentage: false,
            ..GaugeConfig::default()
        };
        for length in [0, 400_000, 1_000_000] {
            let state = visual_state(&estimate(length, 200_000), &config);
            assert!(!state.display_text.contains('('), "{}", state.display_text);
        }
        assert_eq!(
            visual_state(&estimate(400_000, 200_000), &config).display_text,
            "100K / 200K"
        );
    }

    #[test]
    fn fixed_bands_ignore_thresholds() {
        let config = GaugeConfig {
            safe_threshold: 1_000,
            caution_threshold: 2_000,
            ..GaugeConfig::default()
        };
        // 10_000 units is 5 %: neutral despite exceeding both thresholds
        assert_eq!(band_for(&estimate(40_000, 200_000), &config), Band::Neutral);
        assert_eq!(band_for(&estimate(4 * 139_999, 200_000), &config), Band::Danger);
    }

    #[test]
    fn threshold_bands_follow_configured_units() {
        let config = GaugeConfig {
            band_mode: BandMode::Thresholds,
            ..GaugeConfig::default()
        };
        assert_eq!(band_for(&estimate(4 * 99_999, 200_000), &config), Band::Neutral);
        assert_eq!(band_for(&estimate(4 * 100_000, 200_000), &config), Band::Caution);
        assert_eq!(band_for(&estimate(4 * 140_000, 200_000), &config), Band::Danger);
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = GaugeConfig::default();
        let e = estimate(123_457, 200_000);
        assert_eq!(visual_state(&e, &config), visual_state(&e, &config));
    }

    #[test]
    fn label_uses_guarded_limit() {
        let config = GaugeConfig {
            token_limit: 0,
            ..GaugeConfig::default()
        };
        let state = visual_state(&estimate(0, config.effective_limit()), &config);
        assert_eq!(state.display_text, "0 / 200K (0%)");
    }
}
