//! Client configuration
//!
//! [`GhostConfig`] gathers everything needed to talk to one Ghost site:
//! endpoint, credentials, timeouts, and retry/token tuning. It is plain data
//! (deserializable from whatever config source the host app uses) plus a
//! builder, with validation separated from construction so a config loaded
//! from a file can be checked in one place.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use serde::Deserialize;

use crate::auth::{
    AdminApiKey, ContentApiKey, TokenCache, DEFAULT_SAFETY_MARGIN_SECS,
    DEFAULT_TOKEN_WINDOW_SECS,
};
use crate::error::ApiError;
use crate::http::{ApiExecutor, ReqwestTransport, RetrySettings};

const DEFAULT_ACCEPT_VERSION: &str = "v5.0";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Retry tuning as configuration data.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, counting the first.
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Multiplier applied per retry.
    pub backoff_factor: f64,
    /// Ceiling on any single delay, in seconds.
    pub max_delay_secs: u64,
    /// Whether delays are randomized.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let defaults = RetrySettings::default();
        Self {
            max_attempts: defaults.max_attempts,
            base_delay_ms: defaults.base_delay.as_millis() as u64,
            backoff_factor: defaults.backoff_factor,
            max_delay_secs: defaults.max_delay.as_secs(),
            jitter: defaults.jitter,
        }
    }
}

impl RetryConfig {
    fn settings(&self) -> RetrySettings {
        RetrySettings {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_secs(self.max_delay_secs),
            jitter: self.jitter,
        }
    }
}

/// Configuration for one Ghost site.
#[derive(Debug, Clone, Deserialize)]
pub struct GhostConfig {
    /// Site origin, for example `https://demo.ghost.io`.
    pub base_url: String,
    /// `Accept-Version` header value.
    #[serde(default = "default_accept_version")]
    pub accept_version: String,
    /// Content API key; required for content-scoped calls.
    #[serde(default)]
    pub content_api_key: Option<String>,
    /// Admin API key in `id:secret` form; required for admin-scoped calls.
    #[serde(default)]
    pub admin_api_key: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retry tuning.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Lifetime of minted admin tokens, in seconds.
    #[serde(default = "default_token_window_secs")]
    pub token_window_secs: i64,
    /// Remaining lifetime below which a cached token is re-minted.
    #[serde(default = "default_safety_margin_secs")]
    pub token_safety_margin_secs: i64,
}

fn default_accept_version() -> String {
    DEFAULT_ACCEPT_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_token_window_secs() -> i64 {
    DEFAULT_TOKEN_WINDOW_SECS
}

fn default_safety_margin_secs() -> i64 {
    DEFAULT_SAFETY_MARGIN_SECS
}

impl GhostConfig {
    /// Starts building a config for `base_url` with defaults everywhere
    /// else.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> GhostConfigBuilder {
        GhostConfigBuilder {
            config: Self {
                base_url: base_url.into(),
                accept_version: default_accept_version(),
                content_api_key: None,
                admin_api_key: None,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                retry: RetryConfig::default(),
                token_window_secs: DEFAULT_TOKEN_WINDOW_SECS,
                token_safety_margin_secs: DEFAULT_SAFETY_MARGIN_SECS,
            },
        }
    }

    /// Checks internal consistency: a usable endpoint, at least one
    /// credential, and sane timing values.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] naming the first violated constraint.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.base_url.trim().is_empty() {
            return Err(ApiError::Config("base_url must not be empty".to_string()));
        }
        if self.content_api_key.is_none() && self.admin_api_key.is_none() {
            return Err(ApiError::Config(
                "at least one of content_api_key or admin_api_key is required".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::Config("timeout_secs must be positive".to_string()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ApiError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.backoff_factor < 1.0 {
            return Err(ApiError::Config(
                "retry.backoff_factor must be at least 1.0".to_string(),
            ));
        }
        if self.token_window_secs <= 0 {
            return Err(ApiError::Config(
                "token_window_secs must be positive".to_string(),
            ));
        }
        if self.token_safety_margin_secs < 0
            || self.token_safety_margin_secs >= self.token_window_secs
        {
            return Err(ApiError::Config(
                "token_safety_margin_secs must be non-negative and below the token window"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Wires a ready-to-use executor from this config: transport, parsed
    /// credentials, token cache, and retry settings.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if validation fails and
    /// [`ApiError::InvalidCredential`] if a configured key is malformed.
    pub fn build_executor(&self) -> Result<ApiExecutor, ApiError> {
        self.validate()?;

        let transport = ReqwestTransport::new(
            &self.base_url,
            self.accept_version.clone(),
            Duration::from_secs(self.timeout_secs),
        )?;
        let mut executor = ApiExecutor::new(Arc::new(transport), self.retry.settings());

        if let Some(raw) = &self.content_api_key {
            executor = executor.with_content_key(ContentApiKey::parse(raw)?);
        }
        if let Some(raw) = &self.admin_api_key {
            let cache = TokenCache::with_timing(
                AdminApiKey::parse(raw)?,
                TimeDelta::seconds(self.token_window_secs),
                TimeDelta::seconds(self.token_safety_margin_secs),
            );
            executor = executor.with_admin_tokens(Arc::new(cache));
        }

        Ok(executor)
    }
}

/// Builder for [`GhostConfig`].
#[derive(Debug)]
pub struct GhostConfigBuilder {
    config: GhostConfig,
}

impl GhostConfigBuilder {
    #[must_use]
    pub fn accept_version(mut self, version: impl Into<String>) -> Self {
        self.config.accept_version = version.into();
        self
    }

    #[must_use]
    pub fn content_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.content_api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn admin_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.admin_api_key = Some(key.into());
        self
    }

    /// Per-request timeout; sub-second durations round up to one second,
    /// the config's granularity.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let mut secs = timeout.as_secs();
        if timeout.subsec_nanos() > 0 {
            secs += 1;
        }
        self.config.timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    #[must_use]
    pub fn token_window_secs(mut self, secs: i64) -> Self {
        self.config.token_window_secs = secs;
        self
    }

    #[must_use]
    pub fn token_safety_margin_secs(mut self, secs: i64) -> Self {
        self.config.token_safety_margin_secs = secs;
        self
    }

    /// Finishes the build, running validation.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the assembled config is inconsistent.
    pub fn build(self) -> Result<GhostConfig, ApiError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
