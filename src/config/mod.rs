//! Configuration snapshot.
//!
//! `GaugeConfig` is an immutable mirror of the persisted settings. The
//! store delivers edits as a [`ChangeSet`]; [`GaugeConfig::merge`] folds one
//! into a fresh snapshot so no component ever observes a half-applied edit.
//! Values of the wrong type fall back to the field default instead of
//! failing.

pub mod settings;
pub mod store;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Store keys, as written by the settings form.
pub mod keys {
    pub const IS_ENABLED: &str = "isEnabled";
    pub const SHOW_PERCENTAGE: &str = "showPercentage";
    pub const POSITION: &str = "position";
    pub const TOKEN_LIMIT: &str = "tokenLimit";
    pub const SAFE_THRESHOLD: &str = "safeThreshold";
    pub const CAUTION_THRESHOLD: &str = "cautionThreshold";
    pub const BAND_MODE: &str = "bandMode";
}

pub const DEFAULT_TOKEN_LIMIT: i64 = 200_000;
pub const DEFAULT_SAFE_THRESHOLD: i64 = 100_000;
pub const DEFAULT_CAUTION_THRESHOLD: i64 = 140_000;

/// Screen corner the gauge is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    pub const ALL: [Position; 4] = [
        Position::BottomRight,
        Position::BottomLeft,
        Position::TopRight,
        Position::TopLeft,
    ];

    /// Placement class applied to the gauge element.
    pub fn css_class(self) -> &'static str {
        match self {
            Position::BottomRight => "bottom-right",
            Position::BottomLeft => "bottom-left",
            Position::TopRight => "top-right",
            Position::TopLeft => "top-left",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.css_class() == s)
    }

    /// Lenient conversion from a stored value; anything unrecognised is the
    /// default corner.
    pub fn from_value(value: &Value) -> Self {
        value.as_str().and_then(Self::parse).unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::BottomRight => "Bottom right",
            Position::BottomLeft => "Bottom left",
            Position::TopRight => "Top right",
            Position::TopLeft => "Top left",
        }
    }
}

/// How the label color is chosen.
///
/// `Fixed` uses the 50 % / 70 % cutoffs and ignores the configured
/// thresholds. `Thresholds` compares the estimated units against
/// `safeThreshold` / `cautionThreshold` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandMode {
    #[default]
    Fixed,
    Thresholds,
}

impl BandMode {
    pub fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("thresholds") => BandMode::Thresholds,
            _ => BandMode::Fixed,
        }
    }
}

/// Immutable settings snapshot shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GaugeConfig {
    #[serde(rename = "isEnabled")]
    pub enabled: bool,
    pub show_percentage: bool,
    pub position: Position,
    pub token_limit: i64,
    pub safe_threshold: i64,
    pub caution_threshold: i64,
    pub band_mode: BandMode,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            show_percentage: true,
            position: Position::BottomRight,
            token_limit: DEFAULT_TOKEN_LIMIT,
            safe_threshold: DEFAULT_SAFE_THRESHOLD,
            caution_threshold: DEFAULT_CAUTION_THRESHOLD,
            band_mode: BandMode::Fixed,
        }
    }
}

impl GaugeConfig {
    /// Build a snapshot from raw store values, defaulting missing keys.
    pub fn from_values(values: &Map<String, Value>) -> Self {
        let mut config = Self::default();
        for (key, value) in values {
            config.apply(key, Some(value));
        }
        config
    }

    /// Apply a change notification, producing a new snapshot.
    pub fn merge(&self, changes: &ChangeSet) -> Self {
        let mut next = self.clone();
        for (key, change) in changes.iter() {
            next.apply(key, change.new_value.as_ref());
        }
        next
    }

    /// The store representation written on first install.
    pub fn to_values(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Capacity limit guarded against non-positive values.
    pub fn effective_limit(&self) -> i64 {
        if self.token_limit > 0 {
            self.token_limit
        } else {
            DEFAULT_TOKEN_LIMIT
        }
    }

    fn apply(&mut self, key: &str, value: Option<&Value>) {
        let defaults = Self::default();
        match key {
            keys::IS_ENABLED => {
                self.enabled = value.and_then(Value::as_bool).unwrap_or(defaults.enabled)
            }
            keys::SHOW_PERCENTAGE => {
                self.show_percentage = value
                    .and_then(Value::as_bool)
                    .unwrap_or(defaults.show_percentage)
            }
            keys::POSITION => {
                self.position = value.map(Position::from_value).unwrap_or_default()
            }
            keys::TOKEN_LIMIT => {
                self.token_limit = value
                    .and_then(as_integer)
                    .filter(|v| *v > 0)
                    .unwrap_or(defaults.token_limit)
            }
            keys::SAFE_THRESHOLD => {
                self.safe_threshold = value
                    .and_then(as_integer)
                    .unwrap_or(defaults.safe_threshold)
            }
            keys::CAUTION_THRESHOLD => {
                self.caution_threshold = value
                    .and_then(as_integer)
                    .unwrap_or(defaults.caution_threshold)
            }
            keys::BAND_MODE => {
                self.band_mode = value.map(BandMode::from_value).unwrap_or_default()
            }
            other => log::debug!("Token Gauge: ignoring unknown setting {other}"),
        }
    }
}

/// Integers may arrive as JSON floats (`200000.0`) from some writers.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// One changed field in a store notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

/// A batch of field changes delivered together by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    changes: BTreeMap<String, Change>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, old_value: Option<Value>, new_value: Option<Value>) {
        self.changes.insert(key.into(), Change { old_value, new_value });
    }

    /// Convenience constructor for a single `{ newValue }` change.
    pub fn single(key: impl Into<String>, new_value: Value) -> Self {
        let mut set = Self::new();
        set.insert(key, None, Some(new_value));
        set
    }

    pub fn touches(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Change> {
        self.changes.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Change)> {
        self.changes.iter()
    }
}
