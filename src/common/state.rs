use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{ApiClient, CurrentReadings};
use crate::chart::{self, ChartRow, IntervalRange, IntervalToken, MetricSeries};
use crate::config::Config;
use crate::metric::{Device, Metric};
use crate::thresholds::{ThresholdSet, WarningLevel};

/// One metric's chart, shaped and ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricChart {
    pub series: MetricSeries,
    pub domain: (f64, f64),
    pub rows: Vec<ChartRow>,
}

impl MetricChart {
    /// Shape already-gapped series: y-axis bounds and merged rows.
    #[must_use]
    pub fn from_series(metric: Metric, series: MetricSeries) -> Self {
        let domain = chart::default_domain(&series, metric.kind());
        let rows = chart::merge_devices(&series);
        Self {
            series,
            domain,
            rows,
        }
    }
}

/// Everything the dashboard shows. Failed refreshes set a banner and keep
/// the previous data.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub interval: IntervalToken,
    pub range: Option<IntervalRange>,
    pub current: Option<CurrentReadings>,
    pub current_error: Option<String>,
    pub charts: BTreeMap<Metric, MetricChart>,
    pub chart_error: Option<String>,
    pub thresholds: Option<ThresholdSet>,
}

impl DashboardState {
    #[must_use]
    pub fn new(interval: IntervalToken) -> Self {
        Self {
            interval,
            range: None,
            current: None,
            current_error: None,
            charts: BTreeMap::new(),
            chart_error: None,
            thresholds: None,
        }
    }

    /// Warning level of a building's current value, `None` until both the
    /// reading and the thresholds are known.
    #[must_use]
    pub fn warning(&self, device: Device, metric: Metric) -> Option<WarningLevel> {
        let value = self.current.as_ref()?.get(device)?.value(metric)?;
        Some(self.thresholds?.classify(metric, value))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: Arc<ApiClient>,
    pub dashboard: Arc<RwLock<DashboardState>>,
}

impl AppState {
    pub fn new(config: Config, client: ApiClient) -> Self {
        let dashboard = DashboardState::new(config.chart_interval);
        Self {
            config: Arc::new(config),
            client: Arc::new(client),
            dashboard: Arc::new(RwLock::new(dashboard)),
        }
    }

    /// Copy of the current dashboard state.
    pub async fn snapshot(&self) -> DashboardState {
        self.dashboard.read().await.clone()
    }
}
