//! Retry executor
//!
//! [`ApiExecutor`] owns the full attempt lifecycle for one logical API call:
//! it attaches the right credential for the target scope, sends through the
//! [`Transport`], classifies the outcome, and decides between surfacing,
//! backing off, or refreshing credentials. Transports stay policy-free; all
//! retry behavior is here.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, debug_span, error, warn, Instrument};
use uuid::Uuid;

use crate::auth::{ContentApiKey, TokenCache};
use crate::error::{ApiError, ErrorKind};
use crate::http::classify::classify;
use crate::http::intent::{ApiResponse, ApiScope, RequestIntent};
use crate::http::transport::{AuthCarrier, RequestOutcome, Transport};

/// Retry tuning for the executor.
#[derive(Debug, Clone)]
pub struct RetrySettings {
    /// Total attempts per call, counting the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Multiplier applied per retry.
    pub backoff_factor: f64,
    /// Ceiling on any single computed delay.
    pub max_delay: Duration,
    /// Whether to randomize delays; disabled in tests for determinism.
    pub jitter: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(10),
            jitter: true,
        }
    }
}

impl RetrySettings {
    /// Delay before retry number `retry_index` (zero-based), before jitter.
    fn backoff_delay(&self, retry_index: u32) -> Duration {
        let scaled =
            self.base_delay.as_secs_f64() * self.backoff_factor.powi(retry_index as i32);
        Duration::from_secs_f64(scaled.min(self.max_delay.as_secs_f64()))
    }

    fn delay_for(&self, retry_index: u32) -> Duration {
        let delay = self.backoff_delay(retry_index);
        if self.jitter {
            // Scale into [0.5, 1.0) so concurrent callers spread out.
            delay.mul_f64(0.5 + rand::random::<f64>() * 0.5)
        } else {
            delay
        }
    }
}

/// Drives credentialed, retried API calls over a [`Transport`].
#[derive(Clone)]
pub struct ApiExecutor {
    transport: Arc<dyn Transport>,
    content_key: Option<ContentApiKey>,
    admin_tokens: Option<Arc<TokenCache>>,
    settings: RetrySettings,
}

// Transport objects and token caches carry no useful Debug output; only the
// retry settings and which credential scopes are configured are printed.
impl std::fmt::Debug for ApiExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiExecutor")
            .field("content_key", &self.content_key)
            .field("admin_tokens", &self.admin_tokens.is_some())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ApiExecutor {
    /// An executor with no credentials attached; every call will fail with a
    /// config error until a credential is provided for its scope.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, settings: RetrySettings) -> Self {
        Self { transport, content_key: None, admin_tokens: None, settings }
    }

    /// Attaches the content API key used by content-scoped calls.
    #[must_use]
    pub fn with_content_key(mut self, key: ContentApiKey) -> Self {
        self.content_key = Some(key);
        self
    }

    /// Attaches the token cache used by admin-scoped calls.
    #[must_use]
    pub fn with_admin_tokens(mut self, cache: Arc<TokenCache>) -> Self {
        self.admin_tokens = Some(cache);
        self
    }

    async fn auth_for(&self, scope: ApiScope) -> Result<AuthCarrier, ApiError> {
        match scope {
            ApiScope::Content => {
                let key = self.content_key.as_ref().ok_or_else(|| {
                    ApiError::Config("content api key not configured".to_string())
                })?;
                Ok(AuthCarrier::QueryKey(key.as_str().to_string()))
            }
            ApiScope::Admin => {
                let cache = self.admin_tokens.as_ref().ok_or_else(|| {
                    ApiError::Config("admin api key not configured".to_string())
                })?;
                let token = cache.current(Utc::now()).await?;
                Ok(AuthCarrier::Header(token.value))
            }
        }
    }

    async fn invalidate_admin(&self) {
        if let Some(cache) = &self.admin_tokens {
            cache.invalidate().await;
        }
    }

    /// Executes `intent` against the `scope` surface, retrying transient
    /// failures and refreshing a stale admin token once.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] when the scope's credential is missing,
    /// [`ApiError::InvalidCredential`] when token minting fails, and
    /// [`ApiError::Request`] for every classified remote failure; the latter
    /// reports how many attempts were made and whether the budget ran out.
    pub async fn execute(
        &self,
        scope: ApiScope,
        intent: &RequestIntent,
    ) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();
        let span = debug_span!("api_request", %request_id, %scope, path = %intent.path);
        self.execute_inner(scope, intent).instrument(span).await
    }

    async fn execute_inner(
        &self,
        scope: ApiScope,
        intent: &RequestIntent,
    ) -> Result<ApiResponse, ApiError> {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut attempt: u32 = 0;
        let mut auth_refreshed = false;

        loop {
            attempt += 1;
            let auth = self.auth_for(scope).await?;
            let outcome = self.transport.send(scope, intent, &auth).await?;

            let Some(classified) = classify(&outcome) else {
                debug!(%scope, path = %intent.path, attempt, "request succeeded");
                return Ok(ApiResponse {
                    status: outcome.status,
                    headers: outcome.headers,
                    body: outcome.body,
                    attempts: attempt,
                });
            };

            match classified.kind {
                // One free re-auth per call: the stale token is discarded
                // and the attempt repeats without consuming retry budget.
                ErrorKind::AuthExpired
                    if !auth_refreshed && matches!(scope, ApiScope::Admin) =>
                {
                    warn!(path = %intent.path, "token rejected as stale; re-minting");
                    self.invalidate_admin().await;
                    auth_refreshed = true;
                    attempt -= 1;
                }
                ErrorKind::AuthInvalid => {
                    self.invalidate_admin().await;
                    return Err(request_error(&outcome, classified.kind, attempt, false));
                }
                kind if kind.is_retryable() => {
                    if attempt >= max_attempts {
                        error!(%scope, path = %intent.path, attempt, %kind, "retry budget exhausted");
                        return Err(request_error(&outcome, kind, attempt, true));
                    }
                    let delay = classified
                        .retry_after
                        .unwrap_or_else(|| self.settings.delay_for(attempt - 1));
                    warn!(
                        %scope, path = %intent.path, attempt, %kind,
                        delay_ms = delay.as_millis() as u64,
                        "transient failure; backing off",
                    );
                    tokio::time::sleep(delay).await;
                }
                kind => {
                    return Err(request_error(&outcome, kind, attempt, false));
                }
            }
        }
    }
}

fn request_error(
    outcome: &RequestOutcome,
    kind: ErrorKind,
    attempts: u32,
    attempts_exhausted: bool,
) -> ApiError {
    let message = outcome
        .message
        .clone()
        .unwrap_or_else(|| format!("request failed with status {}", outcome.status));
    ApiError::Request {
        kind,
        status: (outcome.status != 0).then_some(outcome.status),
        attempts,
        attempts_exhausted,
        message,
    }
}
