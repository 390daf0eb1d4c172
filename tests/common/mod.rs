//! Shared helpers for tests that talk to a mock backend.

#![allow(dead_code)]

use axum::Router;
use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

use climate_dash::api::ApiClient;
use climate_dash::config::Config;

/// Request bodies received by a mock endpoint, in arrival order.
pub type Recorded = Arc<Mutex<Vec<Value>>>;

/// Serve `app` on an ephemeral local port and return its API base URL.
pub async fn spawn_backend(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// Base URL of a local port nothing listens on.
pub async fn unreachable_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api")
}

pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::with_base_url(base_url);
    config.request_timeout_seconds = 5;
    config
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&test_config(base_url)).unwrap()
}

pub fn recorded() -> Recorded {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn wire_thresholds() -> Value {
    serde_json::json!({
        "temperature_min_hard": 15.0,
        "temperature_min_soft": 18.0,
        "temperature_max_soft": 25.0,
        "temperature_max_hard": 30.0,
        "humidity_min_hard": 30.0,
        "humidity_min_soft": 40.0,
        "humidity_max_soft": 60.0,
        "humidity_max_hard": 70.0,
        "pollen_min_hard": 0,
        "pollen_min_soft": 30,
        "pollen_max_soft": 100,
        "pollen_max_hard": 150,
        "particulate_matter_min_hard": 0,
        "particulate_matter_min_soft": 10,
        "particulate_matter_max_soft": 20,
        "particulate_matter_max_hard": 30
    })
}

/// Formatted log output of the crate, captured in memory.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Subscriber writing this crate's events at debug and above into the buffer.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("climate_dash=debug"))
            .with_writer(self.clone())
            .with_ansi(false)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
