use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::metric::Device;

/// One reading in a device series. `value: None` is a deliberate line break, never a reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    #[serde(default)]
    pub value: Option<f64>,
}

impl Sample {
    #[must_use]
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    #[must_use]
    pub fn gap(timestamp: i64) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }
}

/// Selects one device series inside a [`MetricSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKey {
    Altbau,
    Neubau,
}

impl SeriesKey {
    pub const BOTH: [Self; 2] = [Self::Altbau, Self::Neubau];
}

impl From<Device> for SeriesKey {
    fn from(device: Device) -> Self {
        match device {
            Device::Altbau => Self::Altbau,
            Device::Neubau => Self::Neubau,
        }
    }
}

/// Both buildings' series for one metric, each gapped on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSeries {
    pub altbau_data: Vec<Sample>,
    pub neubau_data: Vec<Sample>,
}

impl MetricSeries {
    #[must_use]
    pub fn series(&self, key: SeriesKey) -> &[Sample] {
        match key {
            SeriesKey::Altbau => &self.altbau_data,
            SeriesKey::Neubau => &self.neubau_data,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.altbau_data.is_empty() && self.neubau_data.is_empty()
    }

    /// Whether the series has at least one real reading (gap markers don't count).
    #[must_use]
    pub fn has_values(&self, key: SeriesKey) -> bool {
        self.series(key).iter().any(|s| s.value.is_some())
    }
}

/// A chart row holding both buildings' value at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartRow {
    pub timestamp: i64,
    pub altbau: Option<f64>,
    pub neubau: Option<f64>,
}

/// Merge both device series into rows on a shared, ascending time axis.
///
/// A timestamp present in only one series yields `None` for the other.
/// If a series repeats a timestamp the later sample wins.
#[must_use]
pub fn merge_devices(series: &MetricSeries) -> Vec<ChartRow> {
    let mut rows: BTreeMap<i64, ChartRow> = BTreeMap::new();

    for sample in &series.altbau_data {
        row_at(&mut rows, sample.timestamp).altbau = sample.value;
    }
    for sample in &series.neubau_data {
        row_at(&mut rows, sample.timestamp).neubau = sample.value;
    }

    rows.into_values().collect()
}

fn row_at(rows: &mut BTreeMap<i64, ChartRow>, timestamp: i64) -> &mut ChartRow {
    rows.entry(timestamp).or_insert_with(|| ChartRow {
        timestamp,
        altbau: None,
        neubau: None,
    })
}
