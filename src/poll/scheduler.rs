use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::common::AppState;
use crate::poll::worker;

/// Poll the current values of both buildings on a schedule.
///
/// There is no retry loop: a failed poll leaves the last readings in place
/// and the next tick tries again.
pub async fn run_current_poll(state: AppState) {
    let interval_secs = state.config.poll_current_interval_seconds;

    tracing::info!(interval_secs, "Starting current values poller");

    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // First tick completes immediately
        ticker.tick().await;

        tracing::debug!("Polling current values...");
        if let Err(e) = worker::refresh_current(&state).await {
            tracing::error!(kind = %e.kind(), error = %e, "Current values poll failed");
        }
    }
}

/// Poll the chart data for the selected interval on a schedule.
pub async fn run_chart_poll(state: AppState) {
    let interval_secs = state.config.poll_chart_interval_seconds;

    tracing::info!(
        interval_secs,
        buckets = state.config.chart_buckets,
        "Starting chart poller"
    );

    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        tracing::debug!("Polling chart data...");
        if let Err(e) = worker::refresh_charts(&state).await {
            tracing::error!(kind = %e.kind(), error = %e, "Chart poll failed");
        }
    }
}
