//! The fixed set of measured quantities and monitored buildings.

use std::fmt;
use std::str::FromStr;

/// How axis bounds for a metric are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Fractional readings (temperature, humidity), bounds rounded to 2 decimals.
    Continuous,
    /// Count-like readings (pollen, particulate matter), bounds snapped to integers.
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Temperature,
    Humidity,
    Pollen,
    ParticulateMatter,
}

impl Metric {
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Humidity,
        Self::Pollen,
        Self::ParticulateMatter,
    ];

    /// Name shown in the dashboard and used as key in UI-shaped payloads.
    #[must_use]
    pub fn ui_name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperatur",
            Self::Humidity => "Luftfeuchtigkeit",
            Self::Pollen => "Pollen",
            Self::ParticulateMatter => "Feinstaub",
        }
    }

    /// Column name used by the backend (`metric` query parameter, threshold field prefix).
    #[must_use]
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pollen => "pollen",
            Self::ParticulateMatter => "particulate_matter",
        }
    }

    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Humidity => "%",
            Self::Pollen | Self::ParticulateMatter => "µg/m³",
        }
    }

    #[must_use]
    pub fn kind(self) -> MetricKind {
        match self {
            Self::Temperature | Self::Humidity => MetricKind::Continuous,
            Self::Pollen | Self::ParticulateMatter => MetricKind::Count,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Temperature => 0,
            Self::Humidity => 1,
            Self::Pollen => 2,
            Self::ParticulateMatter => 3,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ui_name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown metric: {0}")]
pub struct UnknownMetric(pub String);

impl FromStr for Metric {
    type Err = UnknownMetric;

    /// Accepts both UI and wire names. "Feinpartikel" is an older UI label for particulate matter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Temperatur" | "temperature" => Ok(Self::Temperature),
            "Luftfeuchtigkeit" | "humidity" => Ok(Self::Humidity),
            "Pollen" | "pollen" => Ok(Self::Pollen),
            "Feinstaub" | "Feinpartikel" | "particulate_matter" => Ok(Self::ParticulateMatter),
            other => Err(UnknownMetric(other.to_string())),
        }
    }
}

/// A monitored building. The backend knows them as device 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Device {
    Altbau,
    Neubau,
}

impl Device {
    pub const ALL: [Self; 2] = [Self::Altbau, Self::Neubau];

    #[must_use]
    pub fn id(self) -> u32 {
        match self {
            Self::Altbau => 1,
            Self::Neubau => 2,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Altbau => "Altbau",
            Self::Neubau => "Neubau",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
