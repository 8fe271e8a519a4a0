//! Settings form rules.
//!
//! Toggles and the corner are written as-is. Numeric fields are typed as
//! text and only committed when they parse to at least
//! [`MIN_NUMERIC_SETTING`]; anything else leaves the store untouched.

use serde_json::{json, Map, Value};

use super::store::{ConfigStore, StoreError};
use super::{keys, BandMode, GaugeConfig, Position};

pub const MIN_NUMERIC_SETTING: i64 = 1000;

/// A single edit coming from the settings panel.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEdit {
    Enabled(bool),
    ShowPercentage(bool),
    Position(Position),
    BandMode(BandMode),
    TokenLimit(String),
    SafeThreshold(String),
    CautionThreshold(String),
}

/// Parse a typed numeric field, accepting only values the form would save.
pub fn parse_numeric(input: &str) -> Option<i64> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|v| *v >= MIN_NUMERIC_SETTING)
}

/// Write one edit. Returns `Ok(false)` when the edit was rejected.
pub fn apply_edit<S: ConfigStore + ?Sized>(store: &S, edit: &SettingsEdit) -> Result<bool, StoreError> {
    let (key, value) = match edit {
        SettingsEdit::Enabled(on) => (keys::IS_ENABLED, json!(on)),
        SettingsEdit::ShowPercentage(on) => (keys::SHOW_PERCENTAGE, json!(on)),
        SettingsEdit::Position(p) => (keys::POSITION, json!(p.css_class())),
        SettingsEdit::BandMode(mode) => (
            keys::BAND_MODE,
            json!(match mode {
                BandMode::Fixed => "fixed",
                BandMode::Thresholds => "thresholds",
            }),
        ),
        SettingsEdit::TokenLimit(raw) => match parse_numeric(raw) {
            Some(v) => (keys::TOKEN_LIMIT, json!(v)),
            None => return Ok(reject(keys::TOKEN_LIMIT, raw)),
        },
        SettingsEdit::SafeThreshold(raw) => match parse_numeric(raw) {
            Some(v) => (keys::SAFE_THRESHOLD, json!(v)),
            None => return Ok(reject(keys::SAFE_THRESHOLD, raw)),
        },
        SettingsEdit::CautionThreshold(raw) => match parse_numeric(raw) {
            Some(v) => (keys::CAUTION_THRESHOLD, json!(v)),
            None => return Ok(reject(keys::CAUTION_THRESHOLD, raw)),
        },
    };

    let mut values = Map::new();
    values.insert(key.to_string(), value);
    store.set(values)?;
    Ok(true)
}

/// Write a frame's worth of edits in order. When any of them is rejected,
/// returns a form rebuilt from what the store now holds, accepted edits
/// from the same batch included.
pub fn commit_edits<S: ConfigStore + ?Sized>(store: &S, edits: &[SettingsEdit]) -> Option<SettingsForm> {
    let mut rejected = false;
    for edit in edits {
        match apply_edit(store, edit) {
            Ok(true) => {}
            Ok(false) => rejected = true,
            Err(e) => log::warn!("Token Gauge: failed to save setting: {}", e),
        }
    }
    rejected.then(|| SettingsForm::from_values(&store.get_all()))
}

fn reject(key: &str, raw: &str) -> bool {
    log::warn!(
        "Token Gauge: ignoring {key}={raw:?}, expected an integer >= {MIN_NUMERIC_SETTING}"
    );
    false
}

/// Editable copy of the settings shown by the panel.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsForm {
    pub enabled: bool,
    pub show_percentage: bool,
    pub position: Position,
    pub band_mode: BandMode,
    pub token_limit: String,
    pub safe_threshold: String,
    pub caution_threshold: String,
}

impl SettingsForm {
    pub fn from_values(values: &Map<String, Value>) -> Self {
        Self::from_config(&GaugeConfig::from_values(values))
    }

    pub fn from_config(config: &GaugeConfig) -> Self {
        Self {
            enabled: config.enabled,
            show_percentage: config.show_percentage,
            position: config.position,
            band_mode: config.band_mode,
            token_limit: config.token_limit.to_string(),
            safe_threshold: config.safe_threshold.to_string(),
            caution_threshold: config.caution_threshold.to_string(),
        }
    }
}
