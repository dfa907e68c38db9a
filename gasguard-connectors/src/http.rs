//! HTTP client for the `/gas_data` ingest endpoint
//!
//! ## Overview
//!
//! Each reading is posted on its own as
//!
//! ```json
//! {"gas_level": 500, "gas_type": "CO", "resistance_kohm": 1.046, "concentration_ppm": 408.3}
//! ```
//!
//! to `<base_url>/gas_data`. Monitor reports add their rate, alert and
//! hazard fields to the same object.
//!
//! ## Retries
//!
//! Transport errors, 5xx and 429 are retried with exponential backoff
//! (`backoff * 2^attempt`); any other status fails immediately. The client
//! is blocking: the relay loop already runs one reading at a time.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gasguard_connectors::http::{HttpConfig, HttpConnector};
//! use gasguard_core::{GasEstimator, RawReading};
//!
//! let config = HttpConfig::new("http://localhost:5000")
//!     .bearer_token("board-17-token")
//!     .timeout_secs(5);
//! let mut client = HttpConnector::new(config)?;
//!
//! let raw = RawReading::new(500)?;
//! let estimate = GasEstimator::default().estimate(raw);
//! client.post_estimate(&estimate)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::BTreeMap;
use std::thread;
use std::time::Duration;

use base64::Engine;
use gasguard_core::{Estimate, MonitorReport, RawReading};
use serde::Serialize;
use thiserror::Error;

use crate::relay::ReadingSink;
use crate::{ConnectionStats, Connector, ConnectorError};

/// Ingest endpoint path
pub const GAS_DATA_PATH: &str = "/gas_data";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Response body as JSON; plain-text bodies become a JSON string
fn response_value(body: String) -> serde_json::Value {
    if body.is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(&body).unwrap_or(serde_json::Value::String(body))
}

/// Failures talking to the ingest service
#[derive(Debug, Error)]
pub enum HttpError {
    /// No response: DNS, connect, TLS or timeout
    #[error("request to ingest service failed: {0}")]
    Request(String),

    /// The service answered with a non-2xx status
    #[error("ingest service returned {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Payload could not be encoded
    #[error("could not encode payload: {0}")]
    Serialization(String),

    #[error("invalid HTTP settings: {0}")]
    Config(String),
}

impl HttpError {
    /// Whether another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::ServerError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<HttpError> for ConnectorError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Config(msg) => ConnectorError::ConfigError(msg),
            other => ConnectorError::ProtocolError(other.to_string()),
        }
    }
}

/// Settings for [`HttpConnector`]
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Scheme, host and optional path prefix, e.g. `http://localhost:5000`
    pub base_url: String,
    /// Per-request timeout, connect included
    pub timeout: Duration,
    pub auth: AuthMethod,
    /// Extra headers sent with every request
    pub extra_headers: BTreeMap<String, String>,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base delay, doubled on every retry
    pub backoff: Duration,
    /// User agent string
    pub user_agent: String,
}

/// How requests prove who sent them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMethod {
    None,
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// `Authorization: Basic base64(user:password)`
    Basic { username: String, password: String },
    /// Token in a custom header
    ApiKey { header: String, value: String },
}

impl AuthMethod {
    /// Header carrying the credentials, if any
    pub fn header(&self) -> Option<(String, String)> {
        match self {
            Self::None => None,
            Self::Bearer(token) => Some(("Authorization".into(), format!("Bearer {}", token))),
            Self::Basic { username, password } => {
                let encoded = base64::engine::general_purpose::STANDARD
                    .encode(format!("{}:{}", username, password));
                Some(("Authorization".into(), format!("Basic {}", encoded)))
            }
            Self::ApiKey { header, value } => Some((header.clone(), value.clone())),
        }
    }
}

impl HttpConfig {
    /// Defaults for `base_url`: 30 s timeout, 3 retries from 100 ms, no auth
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auth: AuthMethod::None,
            extra_headers: BTreeMap::new(),
            max_retries: 3,
            backoff: Duration::from_millis(100),
            user_agent: format!("GasGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn bearer_token(self, token: impl Into<String>) -> Self {
        self.auth(AuthMethod::Bearer(token.into()))
    }

    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth(AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        })
    }

    /// Send `value` in the `header` header
    pub fn api_key(self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth(AuthMethod::ApiKey {
            header: header.into(),
            value: value.into(),
        })
    }

    pub fn auth(mut self, auth: AuthMethod) -> Self {
        self.auth = auth;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base retry delay in milliseconds
    pub fn backoff_ms(mut self, ms: u64) -> Self {
        self.backoff = Duration::from_millis(ms);
        self
    }

    /// Add a header to every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Delay before retry number `attempt` (1-based): `backoff`, then doubling
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.backoff.checked_mul(factor).unwrap_or(Duration::MAX)
    }
}

/// Body of a `/gas_data` post
#[derive(Debug, Serialize)]
pub struct GasDataPayload<'a, T> {
    pub gas_level: RawReading,
    #[serde(flatten)]
    pub detail: &'a T,
}

/// Blocking `/gas_data` client on a ureq agent
pub struct HttpConnector {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: ConnectionStats,
}

impl HttpConnector {
    /// Validate `config` and build the agent
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        let scheme_ok = ["http://", "https://"]
            .iter()
            .any(|scheme| config.base_url.starts_with(scheme));
        if !scheme_ok {
            return Err(HttpError::Config(format!(
                "base URL {:?} is not http:// or https://",
                config.base_url
            )));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: ConnectionStats::default(),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Absolute URL for `path`
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Post one estimate to the ingest endpoint
    pub fn post_estimate(&mut self, estimate: &Estimate) -> Result<serde_json::Value, HttpError> {
        self.post(
            GAS_DATA_PATH,
            &GasDataPayload {
                gas_level: estimate.raw,
                detail: estimate,
            },
        )
    }

    /// Post one monitor report to the ingest endpoint
    pub fn post_report(&mut self, report: &MonitorReport) -> Result<serde_json::Value, HttpError> {
        self.post(
            GAS_DATA_PATH,
            &GasDataPayload {
                gas_level: report.estimate.raw,
                detail: report,
            },
        )
    }

    /// Send POST request with a JSON body
    ///
    /// A non-JSON response body is returned as a JSON string.
    pub fn post<T: Serialize + ?Sized>(
        &mut self,
        path: &str,
        data: &T,
    ) -> Result<serde_json::Value, HttpError> {
        let json = serde_json::to_string(data).map_err(|e| HttpError::Serialization(e.to_string()))?;
        self.execute_with_retry(path, &json)
    }

    /// JSON request carrying credentials and configured headers
    fn build_request(&self, request: ureq::Request) -> ureq::Request {
        let request = self
            .config
            .extra_headers
            .iter()
            .fold(request, |request, (name, value)| request.set(name, value));

        let request = match self.config.auth.header() {
            Some((name, value)) => request.set(&name, &value),
            None => request,
        };

        request
            .set("Content-Type", "application/json")
            .set("Accept", "application/json")
    }

    /// POST `json` with retry logic
    fn execute_with_retry(&mut self, path: &str, json: &str) -> Result<serde_json::Value, HttpError> {
        let url = self.url(path);
        let mut failure = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                self.stats.retries += 1;
                thread::sleep(self.config.retry_delay(attempt));
            }

            let request = self.build_request(self.agent.post(&url));
            let error = match request.send_string(json) {
                Ok(resp) => {
                    let body = resp.into_string().map_err(|e| HttpError::Request(e.to_string()))?;
                    self.stats.record_success(json.len());
                    return Ok(response_value(body));
                }
                Err(ureq::Error::Status(status, resp)) => HttpError::ServerError {
                    status,
                    message: resp.into_string().unwrap_or_default(),
                },
                Err(ureq::Error::Transport(e)) => HttpError::Request(e.to_string()),
            };

            if !error.is_retryable() {
                self.stats.record_failure(&error);
                return Err(error);
            }
            log::warn!("POST {} attempt {} failed: {}", url, attempt + 1, error);
            failure = Some(error);
        }

        let error = failure.unwrap_or_else(|| HttpError::Request("no attempt made".into()));
        self.stats.record_failure(&error);
        Err(error)
    }
}

impl Connector for HttpConnector {
    type Error = HttpError;

    fn send(&mut self, path: &str, data: &[u8]) -> Result<(), Self::Error> {
        let value: serde_json::Value =
            serde_json::from_slice(data).map_err(|e| HttpError::Serialization(e.to_string()))?;

        self.post(path, &value).map(drop)
    }

    /// No persistent connection to lose
    fn is_connected(&self) -> bool {
        true
    }

    fn stats(&self) -> ConnectionStats {
        self.stats.clone()
    }
}

impl ReadingSink for HttpConnector {
    fn accept(&mut self, report: &MonitorReport) -> Result<(), ConnectorError> {
        let response = self.post_report(report)?;
        log::debug!("sent reading {}, server response: {}", report.estimate.raw, response);
        Ok(())
    }
}
