//! Where encouragement text comes from.
//!
//! [`EncouragementSource`] is the network seam: the cache only ever sees
//! this trait. [`HttpEncouragementSource`] is the production implementation,
//! a `GET {base_url}/encouragement` that expects `{"response": "<text>"}`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{EncouragementError, EncouragementResult};

// ═══════════════════════════════════════════════════════════════════════
//  Constants
// ═══════════════════════════════════════════════════════════════════════

/// Default backend when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const ENDPOINT_PATH: &str = "encouragement";

// ═══════════════════════════════════════════════════════════════════════
//  Trait
// ═══════════════════════════════════════════════════════════════════════

/// Produces one piece of encouragement text per call.
#[async_trait]
pub trait EncouragementSource: Send + Sync {
    async fn fetch_text(&self) -> EncouragementResult<String>;
}

// ═══════════════════════════════════════════════════════════════════════
//  HTTP source
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl SourceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct HttpEncouragementSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpEncouragementSource {
    pub fn new(config: &SourceConfig) -> EncouragementResult<Self> {
        let endpoint = endpoint_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(EncouragementError::transport)?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl EncouragementSource for HttpEncouragementSource {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_text(&self) -> EncouragementResult<String> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(EncouragementError::transport)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(EncouragementError::transport)?;
        debug!(status = status.as_u16(), bytes = body.len(), "encouragement response");

        parse_response(status.as_u16(), status.canonical_reason(), &body)
    }
}

/// `{base_url}/encouragement`, keeping any path prefix on the base.
pub fn endpoint_url(base_url: &str) -> EncouragementResult<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(ENDPOINT_PATH)?)
}

/// Turn a status and raw body into the encouragement text.
///
/// Errors carry the backend's `detail` field when it sent one.
fn parse_response(
    status: u16,
    reason: Option<&str>,
    body: &str,
) -> EncouragementResult<String> {
    let json: Option<Value> = serde_json::from_str(body).ok();

    if !(200..300).contains(&status) {
        let message = json
            .as_ref()
            .and_then(|v| v.get("detail"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status} {}", reason.unwrap_or("error")));
        return Err(EncouragementError::Remote {
            status: Some(status),
            message,
        });
    }

    let json = json.ok_or_else(|| EncouragementError::MalformedResponse("body is not JSON".into()))?;
    match json.get("response").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        Some(_) => Err(EncouragementError::MalformedResponse(
            "`response` is empty".into(),
        )),
        None => Err(EncouragementError::MalformedResponse(
            "missing string field `response`".into(),
        )),
    }
}
