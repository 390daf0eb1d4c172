//! Alert thresholds: the flat wire record, the per-metric UI shape, and the
//! mapping and validation between them.
//!
//! The backend stores four limits per metric as flat fields
//! (`temperature_min_hard`, `temperature_min_soft`, ...). The settings page
//! edits them per metric as four severity levels:
//!
//! | wire field   | UI level      |
//! |--------------|---------------|
//! | `*_min_hard` | `red_low`     |
//! | `*_min_soft` | `yellow_low`  |
//! | `*_max_soft` | `yellow_high` |
//! | `*_max_hard` | `red_high`    |

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{DashError, DashResult};
use crate::metric::Metric;

/// Flat threshold record as read from and posted to `/thresholds`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireThresholds {
    pub temperature_min_hard: f64,
    pub temperature_min_soft: f64,
    pub temperature_max_soft: f64,
    pub temperature_max_hard: f64,

    pub humidity_min_hard: f64,
    pub humidity_min_soft: f64,
    pub humidity_max_soft: f64,
    pub humidity_max_hard: f64,

    pub pollen_min_hard: f64,
    pub pollen_min_soft: f64,
    pub pollen_max_soft: f64,
    pub pollen_max_hard: f64,

    pub particulate_matter_min_hard: f64,
    pub particulate_matter_min_soft: f64,
    pub particulate_matter_max_soft: f64,
    pub particulate_matter_max_hard: f64,
}

impl WireThresholds {
    /// The four limits of `metric`, in UI order.
    #[must_use]
    pub fn levels(&self, metric: Metric) -> ThresholdLevels {
        let (red_low, yellow_low, yellow_high, red_high) = match metric {
            Metric::Temperature => (
                self.temperature_min_hard,
                self.temperature_min_soft,
                self.temperature_max_soft,
                self.temperature_max_hard,
            ),
            Metric::Humidity => (
                self.humidity_min_hard,
                self.humidity_min_soft,
                self.humidity_max_soft,
                self.humidity_max_hard,
            ),
            Metric::Pollen => (
                self.pollen_min_hard,
                self.pollen_min_soft,
                self.pollen_max_soft,
                self.pollen_max_hard,
            ),
            Metric::ParticulateMatter => (
                self.particulate_matter_min_hard,
                self.particulate_matter_min_soft,
                self.particulate_matter_max_soft,
                self.particulate_matter_max_hard,
            ),
        };
        ThresholdLevels {
            red_low,
            yellow_low,
            yellow_high,
            red_high,
        }
    }

    fn set_levels(&mut self, metric: Metric, levels: ThresholdLevels) {
        let (min_hard, min_soft, max_soft, max_hard) = match metric {
            Metric::Temperature => (
                &mut self.temperature_min_hard,
                &mut self.temperature_min_soft,
                &mut self.temperature_max_soft,
                &mut self.temperature_max_hard,
            ),
            Metric::Humidity => (
                &mut self.humidity_min_hard,
                &mut self.humidity_min_soft,
                &mut self.humidity_max_soft,
                &mut self.humidity_max_hard,
            ),
            Metric::Pollen => (
                &mut self.pollen_min_hard,
                &mut self.pollen_min_soft,
                &mut self.pollen_max_soft,
                &mut self.pollen_max_hard,
            ),
            Metric::ParticulateMatter => (
                &mut self.particulate_matter_min_hard,
                &mut self.particulate_matter_min_soft,
                &mut self.particulate_matter_max_soft,
                &mut self.particulate_matter_max_hard,
            ),
        };
        *min_hard = levels.red_low;
        *min_soft = levels.yellow_low;
        *max_soft = levels.yellow_high;
        *max_hard = levels.red_high;
    }
}

/// One stored threshold row. The backend may attach the alert address to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRecord {
    #[serde(flatten)]
    pub limits: WireThresholds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_email: Option<String>,
}

/// Per-metric limits as edited on the settings page.
///
/// Serialized in camelCase (`redLow`, ...) because that is the shape the
/// alert-mail endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdLevels {
    pub red_low: f64,
    pub yellow_low: f64,
    pub yellow_high: f64,
    pub red_high: f64,
}

/// Severity slot within [`ThresholdLevels`], used to address a single edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    RedLow,
    YellowLow,
    YellowHigh,
    RedHigh,
}

impl Level {
    pub const ALL: [Self; 4] = [
        Self::RedLow,
        Self::YellowLow,
        Self::YellowHigh,
        Self::RedHigh,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::RedLow => "red low",
            Self::YellowLow => "yellow low",
            Self::YellowHigh => "yellow high",
            Self::RedHigh => "red high",
        }
    }
}

/// How far a reading is outside its metric's limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningLevel {
    Normal,
    Yellow,
    Red,
}

impl ThresholdLevels {
    #[must_use]
    pub fn get(&self, level: Level) -> f64 {
        match level {
            Level::RedLow => self.red_low,
            Level::YellowLow => self.yellow_low,
            Level::YellowHigh => self.yellow_high,
            Level::RedHigh => self.red_high,
        }
    }

    pub fn set(&mut self, level: Level, value: f64) {
        match level {
            Level::RedLow => self.red_low = value,
            Level::YellowLow => self.yellow_low = value,
            Level::YellowHigh => self.yellow_high = value,
            Level::RedHigh => self.red_high = value,
        }
    }

    /// Classify a reading. Values exactly on a limit are still inside it.
    #[must_use]
    pub fn classify(&self, value: f64) -> WarningLevel {
        if value < self.red_low || value > self.red_high {
            WarningLevel::Red
        } else if value < self.yellow_low || value > self.yellow_high {
            WarningLevel::Yellow
        } else {
            WarningLevel::Normal
        }
    }

    /// First ordering rule this metric breaks, if any.
    ///
    /// Comparisons are strict, so equal neighbours and NaN are both rejected.
    fn violation(&self, metric: Metric) -> Option<String> {
        let rules = [
            (Level::RedLow, Level::YellowLow),
            (Level::RedLow, Level::RedHigh),
            (Level::YellowLow, Level::YellowHigh),
            (Level::YellowHigh, Level::RedHigh),
        ];
        rules.into_iter().find_map(|(lower, upper)| {
            let (lo, hi) = (self.get(lower), self.get(upper));
            if lo < hi {
                None
            } else {
                Some(format!(
                    "{metric}: {} ({lo}) must be less than {} ({hi})",
                    lower.label(),
                    upper.label()
                ))
            }
        })
    }
}

/// Limits for every metric, in UI shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdSet {
    levels: [ThresholdLevels; 4],
}

impl ThresholdSet {
    #[must_use]
    pub fn new(
        temperature: ThresholdLevels,
        humidity: ThresholdLevels,
        pollen: ThresholdLevels,
        particulate_matter: ThresholdLevels,
    ) -> Self {
        Self {
            levels: [temperature, humidity, pollen, particulate_matter],
        }
    }

    #[must_use]
    pub fn get(&self, metric: Metric) -> &ThresholdLevels {
        &self.levels[metric.index()]
    }

    pub fn get_mut(&mut self, metric: Metric) -> &mut ThresholdLevels {
        &mut self.levels[metric.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, &ThresholdLevels)> {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }

    #[must_use]
    pub fn classify(&self, metric: Metric, value: f64) -> WarningLevel {
        self.get(metric).classify(value)
    }
}

impl Serialize for ThresholdSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.levels.len()))?;
        for (metric, levels) in self.iter() {
            map.serialize_entry(metric.ui_name(), levels)?;
        }
        map.end()
    }
}

/// Wire record → UI shape.
#[must_use]
pub fn to_ui(wire: &WireThresholds) -> ThresholdSet {
    ThresholdSet::new(
        wire.levels(Metric::Temperature),
        wire.levels(Metric::Humidity),
        wire.levels(Metric::Pollen),
        wire.levels(Metric::ParticulateMatter),
    )
}

/// UI shape → wire record. Inverse of [`to_ui`].
#[must_use]
pub fn to_api(ui: &ThresholdSet) -> WireThresholds {
    let mut wire = WireThresholds {
        temperature_min_hard: 0.0,
        temperature_min_soft: 0.0,
        temperature_max_soft: 0.0,
        temperature_max_hard: 0.0,
        humidity_min_hard: 0.0,
        humidity_min_soft: 0.0,
        humidity_max_soft: 0.0,
        humidity_max_hard: 0.0,
        pollen_min_hard: 0.0,
        pollen_min_soft: 0.0,
        pollen_max_soft: 0.0,
        pollen_max_hard: 0.0,
        particulate_matter_min_hard: 0.0,
        particulate_matter_min_soft: 0.0,
        particulate_matter_max_soft: 0.0,
        particulate_matter_max_hard: 0.0,
    };
    for (metric, levels) in ui.iter() {
        wire.set_levels(metric, *levels);
    }
    wire
}

/// Check `red_low < yellow_low < yellow_high < red_high` for every metric.
///
/// Returns the message for the first violation, checking metrics in
/// display order and, within a metric, red low vs yellow low, then red low
/// vs red high, then yellow low vs yellow high, then yellow high vs red high.
#[must_use]
pub fn validate(ui: &ThresholdSet) -> Option<String> {
    ui.iter()
        .find_map(|(metric, levels)| levels.violation(metric))
}

/// Settings-page state: the last saved snapshot plus the in-memory edits.
#[derive(Debug, Clone)]
pub struct ThresholdEditor {
    original: ThresholdSet,
    current: ThresholdSet,
}

impl ThresholdEditor {
    #[must_use]
    pub fn new(loaded: ThresholdSet) -> Self {
        Self {
            original: loaded,
            current: loaded,
        }
    }

    #[must_use]
    pub fn from_wire(wire: &WireThresholds) -> Self {
        Self::new(to_ui(wire))
    }

    #[must_use]
    pub fn current(&self) -> &ThresholdSet {
        &self.current
    }

    #[must_use]
    pub fn original(&self) -> &ThresholdSet {
        &self.original
    }

    pub fn set(&mut self, metric: Metric, level: Level, value: f64) {
        self.current.get_mut(metric).set(level, value);
    }

    /// Unsaved edits exist. Used to enable saving and to guard navigation.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.current != self.original
    }

    /// Drop edits and return to the last saved snapshot.
    pub fn reset(&mut self) {
        self.current = self.original;
    }

    /// Validated wire record for the current edits.
    ///
    /// # Errors
    ///
    /// Returns `DashError::Validation` naming the first rule the edits break.
    pub fn payload(&self) -> DashResult<WireThresholds> {
        match validate(&self.current) {
            Some(msg) => Err(DashError::Validation(msg)),
            None => Ok(to_api(&self.current)),
        }
    }

    /// Record a successful save: the current edits become the new snapshot.
    pub fn mark_saved(&mut self) {
        self.original = self.current;
    }
}
