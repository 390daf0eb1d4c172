use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::chart::Sample;
use crate::error::{DashError, DashResult};
use crate::metric::{Device, Metric};
use crate::thresholds::{ThresholdRecord, ThresholdSet};

/// Response body as received: parsed JSON when the server declared JSON, raw text otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    /// The envelope's `status` field (`"success"` / `"error"`), if any.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.as_json()?.get("status")?.as_str()
    }

    /// First non-empty `message` or `error` string in a JSON body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        let json = self.as_json()?;
        ["message", "error"]
            .iter()
            .filter_map(|key| json.get(key)?.as_str())
            .find(|s| !s.is_empty())
    }
}

/// Latest reading of one building. Any field may be missing if its sensor has not reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatestReading {
    #[serde(default, deserialize_with = "optional_number")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub pollen: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub particulate_matter: Option<f64>,
    pub unix_timestamp_seconds: i64,
}

impl LatestReading {
    #[must_use]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pollen => self.pollen,
            Metric::ParticulateMatter => self.particulate_matter,
        }
    }
}

/// Raw JSON for a numeric column. Decimal columns may arrive as strings like `"21.50"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawNumber::Number(n)) => Ok(Some(n)),
        Some(RawNumber::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Response from `/devices/{id}/latest`. `data` is an empty array when the device has no readings.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LatestEnvelope {
    #[serde(default)]
    pub data: Option<LatestData>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum LatestData {
    Reading(LatestReading),
    Empty(Vec<Value>),
}

impl LatestEnvelope {
    pub(crate) fn into_reading(self) -> Option<LatestReading> {
        match self.data {
            Some(LatestData::Reading(r)) => Some(r),
            Some(LatestData::Empty(_)) | None => None,
        }
    }
}

/// Latest readings of both buildings, fetched together.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CurrentReadings {
    pub altbau: Option<LatestReading>,
    pub neubau: Option<LatestReading>,
}

impl CurrentReadings {
    #[must_use]
    pub fn get(&self, device: Device) -> Option<&LatestReading> {
        match device {
            Device::Altbau => self.altbau.as_ref(),
            Device::Neubau => self.neubau.as_ref(),
        }
    }
}

/// Query for `/comparison`. Device 1 and 2 are always compared.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonQuery {
    pub metric: Metric,
    pub start: i64,
    pub end: i64,
    pub buckets: u32,
}

impl ComparisonQuery {
    #[must_use]
    pub fn path(&self) -> String {
        format!(
            "/comparison?device_1={}&device_2={}&metric={}&start={}&end={}&buckets={}",
            Device::Altbau.id(),
            Device::Neubau.id(),
            self.metric.wire_name(),
            self.start,
            self.end,
            self.buckets
        )
    }
}

/// Response from `/comparison`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ComparisonResponse {
    #[serde(default)]
    pub device_1: Vec<Sample>,
    #[serde(default)]
    pub device_2: Vec<Sample>,
    /// Informational warning, e.g. more buckets requested than raw rows exist.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `GET /thresholds`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ThresholdsEnvelope {
    #[serde(default)]
    pub data: Vec<ThresholdRecord>,
}

/// Response from `GET /alert_email`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AlertEmailEnvelope {
    #[serde(default)]
    pub email: Option<String>,
}

/// Body for `POST /alert_email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEmailRequest {
    pub alert_email: String,
}

impl AlertEmailRequest {
    /// # Errors
    ///
    /// Returns `DashError::Validation` if `email` is not a plausible address.
    pub fn new(email: &str) -> DashResult<Self> {
        let email = email.trim();
        validate_email(email).map_err(DashError::Validation)?;
        Ok(Self {
            alert_email: email.to_string(),
        })
    }
}

fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email address is missing".to_string());
    }
    if email.chars().any(char::is_whitespace) {
        return Err(format!("Email address contains whitespace: {email}"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(format!("Email address must contain '@': {email}"));
    };
    let domain_ok = !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());
    if local.is_empty() || !domain_ok {
        return Err(format!("Malformed email address: {email}"));
    }
    Ok(())
}

/// Body for `POST /confirm_email`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmEmailRequest {
    pub token: String,
}

/// Body for `POST /send_alert_mail`. The backend decides whether a mail is
/// due and tracks cooldowns, so every current reading is reported.
#[derive(Debug, Clone, Serialize)]
pub struct AlertMailRequest {
    /// UI metric name, the key into `thresholds`.
    pub metric: &'static str,
    pub value: f64,
    pub thresholds: ThresholdSet,
    pub device: &'static str,
}

impl AlertMailRequest {
    #[must_use]
    pub fn new(device: Device, metric: Metric, value: f64, thresholds: ThresholdSet) -> Self {
        Self {
            metric: metric.ui_name(),
            value,
            thresholds,
            device: device.name(),
        }
    }
}
