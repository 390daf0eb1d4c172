use super::series::{MetricSeries, SeriesKey};
use crate::metric::MetricKind;

/// Fraction of the value range added above and below the data.
pub const DEFAULT_PADDING: f64 = 0.05;

/// Axis range used when there is nothing to plot.
pub const EMPTY_DOMAIN: (f64, f64) = (0.0, 1.0);

/// Padded y-axis bounds over the selected series.
///
/// Gap markers are ignored. A flat series gets a pad of 1 so the axis is
/// never zero-height. Continuous metrics round to 2 decimals; count metrics
/// floor the lower bound and ceil the upper one.
#[must_use]
pub fn compute_domain(
    series: &MetricSeries,
    keys: &[SeriesKey],
    padding: f64,
    kind: MetricKind,
) -> (f64, f64) {
    let values = keys
        .iter()
        .flat_map(|key| series.series(*key))
        .filter_map(|s| s.value)
        .filter(|v| v.is_finite());

    let bounds = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    });
    let Some((min, max)) = bounds else {
        return EMPTY_DOMAIN;
    };

    let range = max - min;
    let pad = if range > 0.0 { range * padding } else { 1.0 };

    match kind {
        MetricKind::Continuous => (round2(min - pad), round2(max + pad)),
        MetricKind::Count => ((min - pad).floor(), (max + pad).ceil()),
    }
}

/// [`compute_domain`] over both buildings with the default padding.
#[must_use]
pub fn default_domain(series: &MetricSeries, kind: MetricKind) -> (f64, f64) {
    compute_domain(series, &SeriesKey::BOTH, DEFAULT_PADDING, kind)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
