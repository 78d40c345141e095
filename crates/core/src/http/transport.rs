//! Transport layer
//!
//! A [`Transport`] performs exactly one credentialed HTTP exchange and
//! reports it as a [`RequestOutcome`]; all retry and re-auth policy lives in
//! the executor above it. [`ReqwestTransport`] is the production
//! implementation; tests substitute scripted fakes.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::http::intent::{ApiScope, RequestIntent};

/// How a single attempt authenticates itself.
#[derive(Debug, Clone)]
pub enum AuthCarrier {
    /// `Authorization: Ghost <token>` header (admin scope).
    Header(String),
    /// `key=<content key>` query parameter (content scope).
    QueryKey(String),
}

/// The raw result of one transport exchange.
///
/// A network-level failure (connect error, timeout) sets `network_failed`
/// and leaves `status` at zero; an HTTP response of any status fills the
/// remaining fields. The transport also normalizes Ghost's error envelope:
/// `error_code` is the lowercased `errors[0].code` (falling back to
/// `errors[0].type`), and `message` is `errors[0].message`.
#[derive(Debug, Clone)]
pub struct RequestOutcome {
    /// HTTP status code; zero when the exchange never completed.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body; `Null` when empty or not JSON.
    pub body: serde_json::Value,
    /// Normalized error code from the Ghost error envelope.
    pub error_code: Option<String>,
    /// Human-readable error message from the envelope.
    pub message: Option<String>,
    /// Whether the exchange failed below the HTTP layer.
    pub network_failed: bool,
}

impl RequestOutcome {
    /// An outcome representing a failure below the HTTP layer.
    #[must_use]
    pub fn network_failure(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            headers: BTreeMap::new(),
            body: serde_json::Value::Null,
            error_code: None,
            message: Some(message.into()),
            network_failed: true,
        }
    }
}

/// Performs one credentialed exchange against a Ghost API surface.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `intent` to the `scope` surface using `auth`, reporting the raw
    /// exchange. Network-level failures are reported inside the outcome, not
    /// as `Err`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the intent cannot be turned into a
    /// well-formed request (bad path joining, unserializable body).
    async fn send(
        &self,
        scope: ApiScope,
        intent: &RequestIntent,
        auth: &AuthCarrier,
    ) -> Result<RequestOutcome, ApiError>;
}

/// Production transport over a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
    client: ReqwestClient,
    base_url: Url,
    accept_version: String,
}

impl ReqwestTransport {
    /// Builds a transport rooted at `base_url` (the site origin, no
    /// `/ghost/` suffix) speaking `accept_version` (for example `v5.0`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if `base_url` does not parse or the
    /// underlying client fails to build.
    pub fn new(
        base_url: &str,
        accept_version: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ApiError::Config(format!("invalid base url {base_url:?}: {err}")))?;

        let client = ReqwestClient::builder()
            .timeout(timeout)
            .user_agent(concat!("ghostwire/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ApiError::Config(format!("failed to build http client: {err}")))?;

        Ok(Self { client, base_url, accept_version: accept_version.into() })
    }

    fn endpoint(&self, scope: ApiScope, path: &str) -> Result<Url, ApiError> {
        let joined = format!(
            "{}/ghost/api/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            scope.path_segment(),
            path.trim_start_matches('/'),
        );
        Url::parse(&joined)
            .map_err(|err| ApiError::Config(format!("invalid request path {path:?}: {err}")))
    }
}

/// Pulls the normalized code and message out of Ghost's error envelope
/// (`{"errors": [{"message", "code", "type"}]}`).
fn extract_error_envelope(body: &serde_json::Value) -> (Option<String>, Option<String>) {
    let Some(first) = body.get("errors").and_then(|e| e.as_array()).and_then(|a| a.first())
    else {
        return (None, None);
    };

    let message = first
        .get("message")
        .and_then(|m| m.as_str())
        .map(ToString::to_string);
    let code = first
        .get("code")
        .and_then(|c| c.as_str())
        .or_else(|| first.get("type").and_then(|t| t.as_str()))
        .map(str::to_lowercase)
        // Older servers omit the code on expiry; recover it from the text.
        .or_else(|| {
            message
                .as_deref()
                .filter(|m| m.to_lowercase().contains("expired"))
                .map(|_| "token_expired".to_string())
        });

    (code, message)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        scope: ApiScope,
        intent: &RequestIntent,
        auth: &AuthCarrier,
    ) -> Result<RequestOutcome, ApiError> {
        let url = self.endpoint(scope, &intent.path)?;

        let mut builder = self
            .client
            .request(intent.method.clone(), url.clone())
            .header("Accept-Version", &self.accept_version)
            .query(&intent.query);

        match auth {
            AuthCarrier::Header(token) => {
                builder = builder.header("Authorization", format!("Ghost {token}"));
            }
            AuthCarrier::QueryKey(key) => {
                builder = builder.query(&[("key", key.as_str())]);
            }
        }

        if let Some(body) = &intent.body {
            builder = builder.json(body);
        }

        debug!(method = %intent.method, %url, %scope, "sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                debug!(%url, error = %err, "transport exchange failed");
                return Ok(RequestOutcome::network_failure(err.to_string()));
            }
        };

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_lowercase(), v.to_string()))
            })
            .collect();

        let body = match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => serde_json::Value::Null,
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
            Err(err) => {
                debug!(%url, error = %err, "failed reading response body");
                return Ok(RequestOutcome::network_failure(err.to_string()));
            }
        };

        let (error_code, message) = extract_error_envelope(&body);

        Ok(RequestOutcome { status, headers, body, error_code, message, network_failed: false })
    }
}
