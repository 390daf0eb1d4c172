use std::env;
use std::str::FromStr;

use crate::chart::IntervalToken;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_POLL_SECS: u64 = 30;
const DEFAULT_CHART_INTERVAL: IntervalToken = IntervalToken::ThreeHours;
const DEFAULT_CHART_BUCKETS: u32 = 360;
const DEFAULT_ALERT_MAILS: bool = true;

/// Variables checked for the API base URL, first non-empty wins.
const BASE_URL_VARS: [&str; 4] = [
    "API_BASE_URL",
    "REACT_APP_API_URL",
    "VITE_API_URL",
    "REACT_APP_API_BASE",
];

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Backend API
    pub api_base_url: String,
    pub request_timeout_seconds: u64,

    // Polling
    pub poll_current_interval_seconds: u64,
    pub poll_chart_interval_seconds: u64,
    pub chart_interval: IntervalToken,
    pub chart_buckets: u32,

    // Alerts
    pub alert_mails_enabled: bool,

    // Logging
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// The API base URL is looked up under `API_BASE_URL` first and then under
    /// the build-time names the web frontend uses. Unset or unparsable values
    /// fall back to the defaults of [`Config::with_base_url`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the API base URL cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let api_base_url = BASE_URL_VARS
            .iter()
            .find_map(|key| env::var(key).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let poll_current = env_or("POLL_CURRENT_INTERVAL_SECONDS", DEFAULT_POLL_SECS);
        let poll_chart = env_or("POLL_CHART_INTERVAL_SECONDS", DEFAULT_POLL_SECS);
        let chart_interval = match env::var("CHART_INTERVAL") {
            Ok(token) => IntervalToken::parse_or_default(&token),
            Err(_) => DEFAULT_CHART_INTERVAL,
        };

        let config = Self {
            api_base_url,
            request_timeout_seconds: env_or("REQUEST_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECS),
            poll_current_interval_seconds: poll_current,
            poll_chart_interval_seconds: poll_chart,
            chart_interval,
            chart_buckets: env_or("CHART_BUCKETS", DEFAULT_CHART_BUCKETS),
            alert_mails_enabled: env_or("ALERT_MAILS_ENABLED", DEFAULT_ALERT_MAILS),
            log_format: LogFormat::from_str(&env::var("LOG_FORMAT").unwrap_or_default()),
        };

        config.validate()?;
        Ok(config)
    }

    /// Configuration pointing at `api_base_url` with every other setting at its default.
    #[must_use]
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            poll_current_interval_seconds: DEFAULT_POLL_SECS,
            poll_chart_interval_seconds: DEFAULT_POLL_SECS,
            chart_interval: DEFAULT_CHART_INTERVAL,
            chart_buckets: DEFAULT_CHART_BUCKETS,
            alert_mails_enabled: DEFAULT_ALERT_MAILS,
            log_format: LogFormat::Text,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        reqwest::Url::parse(&self.api_base_url)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {e}", self.api_base_url)))
    }
}

/// Parse `key` from the environment, `default` if unset or malformed.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid API base URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}
