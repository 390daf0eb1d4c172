use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use climate_dash::api::ApiClient;
use climate_dash::common::AppState;
use climate_dash::config::{Config, LogFormat};
use climate_dash::metric::{Device, Metric};
use climate_dash::poll;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration (fail-fast)
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,climate_dash=debug".into());
    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    tracing::info!("Starting climate-dash...");
    tracing::info!(
        api = %config.api_base_url,
        interval = %config.chart_interval,
        buckets = config.chart_buckets,
        alert_mails = config.alert_mails_enabled,
        "Configuration loaded"
    );

    let client = ApiClient::new(&config)?;
    let state = AppState::new(config, client);

    // Spawn pollers (fire-and-forget, stopped with the runtime)
    tracing::info!("Spawning pollers...");
    tokio::spawn(poll::scheduler::run_current_poll(state.clone()));
    tokio::spawn(poll::scheduler::run_chart_poll(state.clone()));

    shutdown_signal().await;

    let snapshot = state.snapshot().await;
    for device in Device::ALL {
        for metric in Metric::ALL {
            if let Some(level) = snapshot.warning(device, metric) {
                tracing::info!(
                    device = %device,
                    metric = %metric,
                    level = ?level,
                    "Last known warning level"
                );
            }
        }
    }

    tracing::info!("Shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
