use futures::future::join_all;

use crate::api::{AlertMailRequest, ApiClient, ComparisonQuery, CurrentReadings};
use crate::chart::{self, IntervalRange, IntervalToken, MetricSeries};
use crate::common::{AppState, MetricChart};
use crate::error::{DashError, DashResult, ErrorKind};
use crate::metric::{Device, Metric};
use crate::thresholds::{self, ThresholdSet};

/// Fetch one metric's comparison data and gap each building's series.
///
/// # Errors
///
/// Returns the client's error for the comparison request.
pub async fn fetch_metric_series(
    client: &ApiClient,
    metric: Metric,
    interval: IntervalToken,
    range: IntervalRange,
    buckets: u32,
) -> DashResult<MetricSeries> {
    let query = ComparisonQuery {
        metric,
        start: range.start,
        end: range.end,
        buckets,
    };
    let response = client.comparison(&query).await?;

    if let Some(msg) = response.message.as_deref() {
        tracing::debug!(metric = %metric, message = msg, "Comparison returned a notice");
    }

    let gap = interval.gap_threshold_seconds();
    Ok(MetricSeries {
        altbau_data: chart::insert_gaps(&response.device_1, gap),
        neubau_data: chart::insert_gaps(&response.device_2, gap),
    })
}

/// Load thresholds into the dashboard if they are not known yet.
///
/// # Errors
///
/// Returns the client's error; the dashboard keeps running without warning colours.
pub async fn ensure_thresholds(state: &AppState) -> DashResult<()> {
    if state.dashboard.read().await.thresholds.is_some() {
        return Ok(());
    }

    match state.client.thresholds().await? {
        Some(record) => {
            let set = thresholds::to_ui(&record.limits);
            state.dashboard.write().await.thresholds = Some(set);
            tracing::info!("Thresholds loaded");
        }
        None => tracing::warn!("No thresholds available"),
    }
    Ok(())
}

/// Refresh the current values of both buildings.
///
/// On success the readings replace the previous ones and are reported to
/// the alert-mail endpoint. On failure the previous readings stay and the
/// error banner is set.
///
/// # Errors
///
/// Returns the client's error after recording it in the dashboard state.
pub async fn refresh_current(state: &AppState) -> DashResult<()> {
    if let Err(e) = ensure_thresholds(state).await {
        tracing::warn!(error = %e, "Failed to load thresholds");
    }

    let readings = match state.client.latest_pair().await {
        Ok(readings) => readings,
        Err(e) => {
            state.dashboard.write().await.current_error =
                Some("Current readings could not be loaded.".to_string());
            return Err(e);
        }
    };

    let thresholds = {
        let mut dashboard = state.dashboard.write().await;
        dashboard.current = Some(readings);
        dashboard.current_error = None;
        dashboard.thresholds
    };

    log_current(&readings, thresholds.as_ref());

    if state.config.alert_mails_enabled
        && let Some(set) = thresholds
    {
        dispatch_alert_mails(&state.client, &readings, set).await;
    }

    Ok(())
}

/// Report every known current value. The backend decides whether to mail and handles cooldowns.
pub async fn dispatch_alert_mails(
    client: &ApiClient,
    readings: &CurrentReadings,
    set: ThresholdSet,
) {
    let requests: Vec<AlertMailRequest> = Device::ALL
        .into_iter()
        .filter_map(|device| readings.get(device).map(|r| (device, r)))
        .flat_map(|(device, reading)| {
            Metric::ALL.into_iter().filter_map(move |metric| {
                reading
                    .value(metric)
                    .map(|value| AlertMailRequest::new(device, metric, value, set))
            })
        })
        .collect();

    tracing::debug!(count = requests.len(), "Dispatching alert mail checks");
    join_all(requests.iter().map(|r| client.send_alert_mail(r))).await;
}

/// Refresh all metric charts for the selected interval.
///
/// All metrics share one window resolved at the start of the refresh.
/// A metric whose request fails keeps its previous chart. A network
/// failure is returned after all metrics were tried.
///
/// # Errors
///
/// Returns the first network error, or the first API error if no request
/// failed at the transport level.
pub async fn refresh_charts(state: &AppState) -> DashResult<()> {
    let interval = state.dashboard.read().await.interval;
    let range = chart::resolve_now(interval);
    let buckets = state.config.chart_buckets;

    let results = join_all(Metric::ALL.into_iter().map(|metric| async move {
        let series = fetch_metric_series(&state.client, metric, interval, range, buckets).await;
        (metric, series)
    }))
    .await;

    let mut first_error: Option<DashError> = None;
    let mut dashboard = state.dashboard.write().await;

    // The interval may have changed while the requests were in flight.
    if dashboard.interval != interval {
        tracing::debug!(
            fetched = %interval,
            selected = %dashboard.interval,
            "Discarding chart refresh for stale interval"
        );
        return Ok(());
    }

    for (metric, result) in results {
        match result {
            Ok(series) => {
                let chart = MetricChart::from_series(metric, series);
                dashboard.charts.insert(metric, chart);
            }
            Err(e) => {
                tracing::warn!(metric = %metric, error = %e, "Chart refresh failed");
                let replace = first_error.as_ref().is_none_or(|prev| {
                    prev.kind() != ErrorKind::Network && e.kind() == ErrorKind::Network
                });
                if replace {
                    first_error = Some(e);
                }
            }
        }
    }

    dashboard.range = Some(range);
    match first_error {
        Some(e) => {
            dashboard.chart_error = Some(match e.kind() {
                ErrorKind::Api => e.user_message(),
                _ => "Chart data could not be loaded.".to_string(),
            });
            Err(e)
        }
        None => {
            dashboard.chart_error = None;
            tracing::debug!(
                interval = %interval,
                start = range.start,
                end = range.end,
                "Charts refreshed"
            );
            Ok(())
        }
    }
}

/// Switch the chart window and refresh the charts right away.
///
/// # Errors
///
/// Returns the error of the immediate refresh.
pub async fn select_interval(state: &AppState, interval: IntervalToken) -> DashResult<()> {
    {
        let mut dashboard = state.dashboard.write().await;
        if dashboard.interval == interval {
            return Ok(());
        }
        dashboard.interval = interval;
    }
    tracing::info!(interval = %interval, label = interval.label(), "Chart interval changed");
    refresh_charts(state).await
}

fn log_current(readings: &CurrentReadings, thresholds: Option<&ThresholdSet>) {
    for device in Device::ALL {
        let Some(reading) = readings.get(device) else {
            tracing::info!(device = %device, "No current data");
            continue;
        };
        let at = chart::format_current_timestamp(reading.unix_timestamp_seconds, &chrono::Local);
        for metric in Metric::ALL {
            let Some(value) = reading.value(metric) else {
                continue;
            };
            let level = thresholds.map(|t| t.classify(metric, value));
            tracing::info!(
                device = %device,
                metric = %metric,
                value,
                unit = metric.unit(),
                level = ?level,
                at = %at,
                "Current reading"
            );
        }
    }
}
