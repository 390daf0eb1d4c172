//! Dashboard refresh tests against a local mock backend.
//!
//! Run with: cargo test --test poll_test

mod common;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use climate_dash::chart::{ChartRow, IntervalToken, Sample};
use climate_dash::common::AppState;
use climate_dash::config::Config;
use climate_dash::error::ErrorKind;
use climate_dash::metric::{Device, Metric};
use climate_dash::poll::{scheduler, worker};
use climate_dash::thresholds::WarningLevel;

use common::{
    Recorded, client, recorded, spawn_backend, test_config, unreachable_base, wire_thresholds,
};

/// Mock backend: both buildings report, thresholds exist, every comparison
/// returns the same two series. While `fail_pollen` is set the pollen
/// comparison answers with a server error. Comparisons answer after
/// `comparison_delay_ms`.
struct Backend {
    mails: Recorded,
    queries: Recorded,
    fail_pollen: Arc<AtomicBool>,
    comparison_delay_ms: Arc<AtomicU64>,
}

impl Backend {
    fn new() -> Self {
        Self {
            mails: recorded(),
            queries: recorded(),
            fail_pollen: Arc::new(AtomicBool::new(false)),
            comparison_delay_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    fn router(&self) -> Router {
        let mails = self.mails.clone();
        let queries = self.queries.clone();
        let fail_pollen = self.fail_pollen.clone();
        let delay_ms = self.comparison_delay_ms.clone();

        Router::new()
            .route("/api/devices/{id}/latest", get(latest))
            .route(
                "/api/thresholds",
                get(|| async {
                    Json(json!({"status": "success", "data": [wire_thresholds()]}))
                }),
            )
            .route(
                "/api/send_alert_mail",
                post(move |Json(body): Json<Value>| {
                    let mails = mails.clone();
                    async move {
                        mails.lock().unwrap().push(body);
                        Json(json!({"status": "success"}))
                    }
                }),
            )
            .route(
                "/api/comparison",
                get(move |Query(params): Query<HashMap<String, String>>| {
                    let queries = queries.clone();
                    let fail_pollen = fail_pollen.clone();
                    let delay_ms = delay_ms.clone();
                    async move {
                        let metric = params.get("metric").cloned().unwrap_or_default();
                        queries.lock().unwrap().push(json!(params));
                        let delay = delay_ms.load(Ordering::SeqCst);
                        if delay > 0 {
                            tokio::time::sleep(Duration::from_millis(delay)).await;
                        }
                        comparison(&metric, fail_pollen.load(Ordering::SeqCst))
                    }
                }),
            )
    }

    fn state(&self, config: Config) -> AppState {
        let api = client(&config.api_base_url);
        AppState::new(config, api)
    }

    fn mail_count(&self) -> usize {
        self.mails.lock().unwrap().len()
    }

    fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

async fn latest(Path(id): Path<u32>) -> Json<Value> {
    let data = match id {
        1 => json!({
            "temperature": 21.0,
            "humidity": "45.0",
            "unix_timestamp_seconds": 1_709_647_620
        }),
        _ => json!({"temperature": 31.0, "unix_timestamp_seconds": 1_709_647_680}),
    };
    Json(json!({"status": "success", "data": data}))
}

fn comparison(metric: &str, fail_pollen: bool) -> Response {
    if fail_pollen && metric == "pollen" {
        let body = json!({"status": "error", "message": "pollen sensor offline"});
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    }
    Json(json!({
        "status": "success",
        "device_1": [
            {"timestamp": 0, "value": 1.0},
            {"timestamp": 10_000, "value": 2.0}
        ],
        "device_2": [{"timestamp": 0, "value": 1.5}],
        "metric": metric
    }))
    .into_response()
}

async fn setup() -> (Backend, AppState) {
    let backend = Backend::new();
    let base = spawn_backend(backend.router()).await;
    let state = backend.state(test_config(&base));
    (backend, state)
}

/// Same dashboard, but requests go to a host nobody listens on.
async fn offline(state: &AppState) -> AppState {
    AppState {
        client: Arc::new(client(&unreachable_base().await)),
        ..state.clone()
    }
}

#[tokio::test]
async fn current_refresh_stores_readings_and_reports_every_value() {
    let (backend, state) = setup().await;

    worker::refresh_current(&state).await.unwrap();

    let snapshot = state.snapshot().await;
    let current = snapshot.current.expect("readings stored");
    assert_eq!(current.altbau.unwrap().value(Metric::Humidity), Some(45.0));
    assert_eq!(
        current.neubau.unwrap().value(Metric::Temperature),
        Some(31.0)
    );
    assert!(snapshot.thresholds.is_some());
    assert_eq!(snapshot.current_error, None);

    assert_eq!(
        snapshot.warning(Device::Altbau, Metric::Temperature),
        Some(WarningLevel::Normal)
    );
    assert_eq!(
        snapshot.warning(Device::Neubau, Metric::Temperature),
        Some(WarningLevel::Red)
    );
    assert_eq!(snapshot.warning(Device::Neubau, Metric::Humidity), None);

    // Altbau: temperature and humidity, Neubau: temperature
    assert_eq!(backend.mail_count(), 3);
    let mails = backend.mails.lock().unwrap().clone();
    let neubau_temperature = mails.iter().any(|m| {
        m["device"] == json!("Neubau")
            && m["metric"] == json!("Temperatur")
            && m["value"] == json!(31.0)
    });
    assert!(neubau_temperature);
    assert_eq!(mails[0]["thresholds"]["Temperatur"]["redHigh"], json!(30.0));
}

#[tokio::test]
async fn alert_mails_can_be_disabled() {
    let backend = Backend::new();
    let base = spawn_backend(backend.router()).await;
    let mut config = test_config(&base);
    config.alert_mails_enabled = false;
    let state = backend.state(config);

    worker::refresh_current(&state).await.unwrap();

    assert!(state.snapshot().await.current.is_some());
    assert_eq!(backend.mail_count(), 0);
}

#[tokio::test]
async fn failed_current_refresh_keeps_last_known_readings() {
    let (_backend, state) = setup().await;
    worker::refresh_current(&state).await.unwrap();
    let before = state.snapshot().await.current;

    let broken = offline(&state).await;
    let err = worker::refresh_current(&broken).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.current, before);
    assert_eq!(
        snapshot.current_error.as_deref(),
        Some("Current readings could not be loaded.")
    );

    // Recovery clears the banner
    worker::refresh_current(&state).await.unwrap();
    assert_eq!(state.snapshot().await.current_error, None);
}

fn row(timestamp: i64, altbau: Option<f64>, neubau: Option<f64>) -> ChartRow {
    ChartRow {
        timestamp,
        altbau,
        neubau,
    }
}

#[tokio::test]
async fn chart_refresh_shapes_every_metric() {
    let (backend, state) = setup().await;

    worker::refresh_charts(&state).await.unwrap();

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.chart_error, None);
    assert_eq!(snapshot.charts.len(), Metric::ALL.len());
    assert_eq!(backend.query_count(), 4);

    let range = snapshot.range.expect("range recorded");
    assert_eq!(range.end - range.start, 10_800);

    // 3h window: 600s threshold, so a marker lands at 600
    let temperature = &snapshot.charts[&Metric::Temperature];
    assert_eq!(
        temperature.series.altbau_data,
        vec![
            Sample::new(0, 1.0),
            Sample::gap(600),
            Sample::new(10_000, 2.0),
        ]
    );
    assert_eq!(temperature.domain, (0.95, 2.05));
    assert_eq!(
        temperature.rows,
        vec![
            row(0, Some(1.0), Some(1.5)),
            row(600, None, None),
            row(10_000, Some(2.0), None),
        ]
    );

    assert_eq!(snapshot.charts[&Metric::Pollen].domain, (0.0, 3.0));

    let queries = backend.queries.lock().unwrap().clone();
    for query in &queries {
        assert_eq!(query["buckets"], json!("360"));
        assert_eq!(query["device_1"], json!("1"));
        assert_eq!(query["device_2"], json!("2"));
    }
    // One shared window for the whole refresh
    assert!(queries.iter().all(|q| q["start"] == queries[0]["start"]));
}

#[tokio::test]
async fn failed_metric_keeps_its_previous_chart() {
    let (backend, state) = setup().await;
    worker::refresh_charts(&state).await.unwrap();
    let pollen_before = state.snapshot().await.charts[&Metric::Pollen].clone();

    backend.fail_pollen.store(true, Ordering::SeqCst);
    let err = worker::refresh_charts(&state).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert_eq!(err.status(), Some(500));

    let snapshot = state.snapshot().await;
    assert_eq!(
        snapshot.chart_error.as_deref(),
        Some("pollen sensor offline")
    );
    assert_eq!(snapshot.charts[&Metric::Pollen], pollen_before);
    assert_eq!(snapshot.charts.len(), 4);

    backend.fail_pollen.store(false, Ordering::SeqCst);
    worker::refresh_charts(&state).await.unwrap();
    assert_eq!(state.snapshot().await.chart_error, None);
}

#[tokio::test]
async fn offline_chart_refresh_sets_generic_banner() {
    let (_backend, state) = setup().await;
    let broken = offline(&state).await;

    let err = worker::refresh_charts(&broken).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);

    let snapshot = state.snapshot().await;
    assert_eq!(
        snapshot.chart_error.as_deref(),
        Some("Chart data could not be loaded.")
    );
    assert!(snapshot.charts.is_empty());
}

#[tokio::test]
async fn selecting_an_interval_refreshes_with_the_new_window() {
    let (backend, state) = setup().await;

    worker::select_interval(&state, IntervalToken::OneDay)
        .await
        .unwrap();

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.interval, IntervalToken::OneDay);
    let range = snapshot.range.unwrap();
    assert_eq!(range.end - range.start, 86_400);

    // 1d window: 3600s threshold
    assert_eq!(
        snapshot.charts[&Metric::Humidity].series.altbau_data[1],
        Sample::gap(3_600)
    );
    assert_eq!(backend.query_count(), 4);

    // Re-selecting the same interval does nothing
    worker::select_interval(&state, IntervalToken::OneDay)
        .await
        .unwrap();
    assert_eq!(backend.query_count(), 4);
}

#[tokio::test]
async fn refresh_for_a_replaced_interval_is_discarded() {
    let (backend, state) = setup().await;
    backend.comparison_delay_ms.store(300, Ordering::SeqCst);

    let refresh = tokio::spawn({
        let state = state.clone();
        async move { worker::refresh_charts(&state).await }
    });

    // Switch while the comparison requests are still in flight
    tokio::time::sleep(Duration::from_millis(100)).await;
    state.dashboard.write().await.interval = IntervalToken::OneWeek;

    assert!(refresh.await.unwrap().is_ok());
    assert_eq!(backend.query_count(), 4);

    let snapshot = state.snapshot().await;
    assert_eq!(snapshot.interval, IntervalToken::OneWeek);
    assert!(snapshot.charts.is_empty());
    assert_eq!(snapshot.range, None);
    assert_eq!(snapshot.chart_error, None);
}

#[tokio::test]
async fn scheduler_fills_the_dashboard_on_first_tick() {
    let (_backend, state) = setup().await;

    let current = tokio::spawn(scheduler::run_current_poll(state.clone()));
    let charts = tokio::spawn(scheduler::run_chart_poll(state.clone()));

    let filled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = state.snapshot().await;
            if snapshot.current.is_some() && snapshot.charts.len() == 4 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    current.abort();
    charts.abort();
    assert!(filled.is_ok(), "pollers did not fill the dashboard in time");
}
