//! Client-side shaping of time-series data for the dashboard charts.
//!
//! A chart refresh runs through these steps:
//!
//! 1. [`IntervalToken::resolve`] turns the selected window into `[start, end]`.
//! 2. The backend returns raw samples per building for that window.
//! 3. [`insert_gaps`] breaks each building's line where samples are missing.
//! 4. [`compute_domain`] derives padded y-axis bounds over both buildings.
//! 5. [`merge_devices`] lines both series up on one time axis for rendering.
//!
//! Everything here is pure and synchronous.

pub mod domain;
pub mod gaps;
pub mod interval;
pub mod labels;
pub mod series;

pub use domain::{DEFAULT_PADDING, EMPTY_DOMAIN, compute_domain, default_domain};
pub use gaps::insert_gaps;
pub use interval::{IntervalRange, IntervalToken, gap_threshold_for, resolve, resolve_now};
pub use labels::{format_axis_label, format_current_timestamp};
pub use series::{ChartRow, MetricSeries, Sample, SeriesKey, merge_devices};
