//! Reachability probe for the completion endpoint.
//!
//! Probes `GET {endpoint}/v1/models` (with Bearer auth when configured) and
//! best-effort verifies the configured model is served. [`HealthService::check`]
//! is resilient and never fails: errors map to `ok = false`, which is
//! convenient for a `/health` route.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::completion_config::CompletionConfig;
use crate::error_handler::{LlmServiceError, make_snippet};

/// A serializable health snapshot for the completion endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model identifier the probe looked for.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`LlmServiceError::HttpTransport`] if the HTTP client cannot
    /// be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, LlmServiceError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Probes the endpoint. Never returns an error; failures are converted
    /// into a `HealthStatus` with `ok = false`.
    pub async fn check(&self, cfg: &CompletionConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            warn!(
                endpoint = %cfg.endpoint,
                "invalid endpoint (empty or missing http/https)"
            );
            return HealthStatus {
                endpoint: endpoint.to_string(),
                model: cfg.model.clone(),
                ok: false,
                latency_ms: 0,
                message: "endpoint is empty or missing http/https".into(),
            };
        }

        let url = format!("{}/v1/models", endpoint.trim_end_matches('/'));
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let start = Instant::now();
        debug!(endpoint = %cfg.endpoint, model = %cfg.model, "GET {}", url);

        let mut req = self.client.get(&url).timeout(timeout);
        if let Some(key) = &cfg.api_key {
            req = req.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let status = HealthStatus {
                    endpoint: cfg.endpoint.clone(),
                    model: cfg.model.clone(),
                    ok: false,
                    latency_ms: start.elapsed().as_millis(),
                    message: e.to_string(),
                };
                warn!(
                    endpoint = %status.endpoint,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "health probe failed"
                );
                return status;
            }
        };

        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let code = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return HealthStatus {
                endpoint: cfg.endpoint.clone(),
                model: cfg.model.clone(),
                ok: false,
                latency_ms: latency,
                message: format!("HTTP {code} from {url}: {}", make_snippet(&text)),
            };
        }

        // Expected minimal JSON: { "data": [ { "id": "<model>" }, ... ] }
        #[derive(serde::Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(serde::Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        let status = match resp.json::<Models>().await {
            Ok(models) => {
                let exists = models.data.iter().any(|m| m.id == cfg.model);
                HealthStatus {
                    endpoint: cfg.endpoint.clone(),
                    model: cfg.model.clone(),
                    ok: true,
                    latency_ms: latency,
                    message: if exists {
                        "endpoint is healthy; model is available".into()
                    } else {
                        "endpoint is up; model not listed in /v1/models".into()
                    },
                }
            }
            Err(e) => HealthStatus {
                endpoint: cfg.endpoint.clone(),
                model: cfg.model.clone(),
                ok: true,
                latency_ms: latency,
                message: format!("endpoint is reachable; failed to decode /v1/models: {e}"),
            },
        };

        info!(
            endpoint = %status.endpoint,
            model = %status.model,
            ok = status.ok,
            latency_ms = status.latency_ms,
            "health probe completed"
        );

        status
    }
}
