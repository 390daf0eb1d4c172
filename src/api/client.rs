use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::api::models::{
    AlertEmailEnvelope, AlertEmailRequest, AlertMailRequest, ComparisonQuery, ComparisonResponse,
    ConfirmEmailRequest, CurrentReadings, LatestEnvelope, LatestReading, Payload,
    ThresholdsEnvelope,
};
use crate::config::{Config, ConfigError};
use crate::error::{DashError, DashResult};
use crate::metric::Device;
use crate::thresholds::{self, ThresholdEditor, ThresholdRecord, ThresholdSet};

/// HTTP client for the dashboard backend.
///
/// Every call resolves to the response payload or a typed [`DashError`].
/// Nothing is retried; a polling caller's next tick is the retry.
pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `DashError::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: &Config) -> DashResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for `path`. Paths that already are URLs are used as-is.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// # Errors
    ///
    /// `DashError::Network` if the request never completed, `DashError::Api`
    /// if the server answered with a non-2xx status or an error envelope.
    pub async fn get(&self, path: &str) -> DashResult<Payload> {
        self.send(Method::GET, path, None::<&()>, &[])
            .await
            .map(|(_, payload)| payload)
    }

    /// # Errors
    ///
    /// Same classification as [`ApiClient::get`].
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> DashResult<Payload> {
        self.send(Method::POST, path, Some(body), &[])
            .await
            .map(|(_, payload)| payload)
    }

    /// Perform one request and classify the outcome.
    ///
    /// Failures with a status listed in `expected` are an ordinary answer for
    /// the caller and are logged at debug level instead of as a warning.
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        expected: &[StatusCode],
    ) -> DashResult<(StatusCode, Payload)> {
        let url = self.url_for(path);

        let mut request = self.http_client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| network_error(&method, &url, &e))?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = response
            .text()
            .await
            .map_err(|e| network_error(&method, &url, &e))?;

        let payload = if is_json {
            match serde_json::from_str(&text) {
                Ok(value) => Payload::Json(value),
                Err(e) => {
                    tracing::warn!(
                        method = %method,
                        url = %url,
                        error = %e,
                        body_preview = %text.chars().take(200).collect::<String>(),
                        "Response declared JSON but did not parse"
                    );
                    Payload::Text(text)
                }
            }
        } else {
            Payload::Text(text)
        };

        if !status.is_success() || payload.status() == Some("error") {
            let message = match payload.message() {
                Some(msg) => msg.to_string(),
                None => status_line(status),
            };
            if expected.contains(&status) {
                tracing::debug!(
                    method = %method,
                    url = %url,
                    status = status.as_u16(),
                    message = %message,
                    "API request answered with an expected error status"
                );
            } else {
                tracing::warn!(
                    method = %method,
                    url = %url,
                    status = status.as_u16(),
                    message = %message,
                    "API request failed"
                );
            }
            return Err(DashError::Api {
                message,
                status: status.as_u16(),
                body: payload,
                url,
                method: method.to_string(),
            });
        }

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "API request ok"
        );
        Ok((status, payload))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        expected: &[StatusCode],
    ) -> DashResult<T> {
        let (status, payload) = self.send(Method::GET, path, None::<&()>, expected).await?;
        decode(Method::GET, self.url_for(path), status, payload)
    }

    /// Latest reading of one building, `None` if it has not reported yet.
    ///
    /// # Errors
    ///
    /// Network and API failures as for [`ApiClient::get`]; an unexpected
    /// body shape is reported as `DashError::Api`.
    pub async fn device_latest(&self, device: Device) -> DashResult<Option<LatestReading>> {
        let envelope: LatestEnvelope = self
            .get_json(&format!("/devices/{}/latest", device.id()), &[])
            .await?;
        Ok(envelope.into_reading())
    }

    /// Latest readings of both buildings, requested concurrently.
    ///
    /// # Errors
    ///
    /// Fails with the first error of either request.
    pub async fn latest_pair(&self) -> DashResult<CurrentReadings> {
        let (altbau, neubau) = futures::try_join!(
            self.device_latest(Device::Altbau),
            self.device_latest(Device::Neubau)
        )?;
        Ok(CurrentReadings { altbau, neubau })
    }

    /// Raw per-building samples for one metric and window.
    ///
    /// # Errors
    ///
    /// Network and API failures as for [`ApiClient::get`].
    pub async fn comparison(&self, query: &ComparisonQuery) -> DashResult<ComparisonResponse> {
        self.get_json(&query.path(), &[]).await
    }

    /// Stored threshold record, `None` if the backend has none yet.
    ///
    /// # Errors
    ///
    /// Network and API failures as for [`ApiClient::get`].
    pub async fn thresholds(&self) -> DashResult<Option<ThresholdRecord>> {
        let envelope: ThresholdsEnvelope = self.get_json("/thresholds", &[]).await?;
        Ok(envelope.data.into_iter().next())
    }

    /// Validate and store a full threshold set.
    ///
    /// # Errors
    ///
    /// `DashError::Validation` without touching the network if the set breaks
    /// the level ordering; otherwise network and API failures.
    pub async fn save_thresholds(&self, set: &ThresholdSet) -> DashResult<()> {
        if let Some(msg) = thresholds::validate(set) {
            tracing::debug!(reason = %msg, "Threshold save blocked by validation");
            return Err(DashError::Validation(msg));
        }
        self.post("/thresholds", &thresholds::to_api(set)).await?;
        tracing::info!("Thresholds saved");
        Ok(())
    }

    /// Save the editor's current edits and make them its new snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::save_thresholds`]. The editor stays dirty on failure.
    pub async fn save_editor(&self, editor: &mut ThresholdEditor) -> DashResult<()> {
        let payload = editor.payload()?;
        self.post("/thresholds", &payload).await?;
        editor.mark_saved();
        tracing::info!("Thresholds saved");
        Ok(())
    }

    /// Configured alert address, `None` if none is set.
    ///
    /// # Errors
    ///
    /// Network and API failures other than the backend's 404 for "no address".
    pub async fn alert_email(&self) -> DashResult<Option<String>> {
        let response = self
            .get_json::<AlertEmailEnvelope>("/alert_email", &[StatusCode::NOT_FOUND])
            .await;
        match response {
            Ok(envelope) => Ok(envelope.email.filter(|e| !e.is_empty())),
            Err(e) if e.status() == Some(StatusCode::NOT_FOUND.as_u16()) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// `DashError::Validation` for a malformed address, otherwise network and API failures.
    pub async fn set_alert_email(&self, email: &str) -> DashResult<Payload> {
        let body = AlertEmailRequest::new(email)?;
        self.post("/alert_email", &body).await
    }

    /// Confirm an alert address with the token from the confirmation mail.
    ///
    /// # Errors
    ///
    /// `DashError::Validation` for an empty token, otherwise network and API failures.
    pub async fn confirm_email(&self, token: &str) -> DashResult<Payload> {
        let token = token.trim();
        if token.is_empty() {
            let msg = "No confirmation token given".to_string();
            return Err(DashError::Validation(msg));
        }
        let body = ConfirmEmailRequest {
            token: token.to_string(),
        };
        self.post("/confirm_email", &body).await
    }

    /// Report a current reading to the alert-mail endpoint. Failures are logged and dropped.
    pub async fn send_alert_mail(&self, request: &AlertMailRequest) {
        if let Err(e) = self.post("/send_alert_mail", request).await {
            tracing::warn!(
                device = request.device,
                metric = request.metric,
                kind = %e.kind(),
                error = %e,
                "Alert mail request failed"
            );
        }
    }
}

fn status_line(status: StatusCode) -> String {
    let reason = status.canonical_reason().unwrap_or_default();
    format!("HTTP {} {reason}", status.as_u16())
        .trim_end()
        .to_string()
}

fn network_error(method: &Method, url: &str, e: &reqwest::Error) -> DashError {
    tracing::error!(method = %method, url = %url, error = %e, "Network error");
    DashError::Network {
        message: e.to_string(),
        url: url.to_string(),
        method: method.to_string(),
    }
}

fn decode<T: DeserializeOwned>(
    method: Method,
    url: String,
    status: StatusCode,
    payload: Payload,
) -> DashResult<T> {
    let parsed = match &payload {
        Payload::Json(value) => T::deserialize(value).map_err(|e| e.to_string()),
        Payload::Text(_) => Err("expected a JSON body".to_string()),
    };
    parsed.map_err(|reason| {
        tracing::error!(
            method = %method,
            url = %url,
            reason = %reason,
            "Unexpected response shape"
        );
        DashError::Api {
            message: format!("Unexpected response shape: {reason}"),
            status: status.as_u16(),
            body: payload,
            url,
            method: method.to_string(),
        }
    })
}
