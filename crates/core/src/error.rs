//! Error taxonomy for the Ghost access layer
//!
//! The taxonomy is a closed set: every failure a caller can observe carries
//! exactly one [`ErrorKind`], so the layer above can render a
//! category-appropriate message ("your credentials are wrong" vs "the service
//! is temporarily unavailable") without string matching.
//!
//! Construction-time failures (`InvalidCredential`, `InvalidFilter`,
//! `Config`) are raised synchronously at the call site that built the bad
//! input and are never retried. Request failures keep their classification
//! and attempt accounting intact all the way to the caller.

use std::fmt;

use thiserror::Error;

/// Classification of a failed request outcome.
///
/// Produced by [`crate::http::classify::classify`]; the retry executor keys
/// its recovery strategy off this value alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport-level failure (connect, DNS, timeout) before a status code
    /// was received.
    Network,
    /// 401 where the signed token's claims are stale; recovered locally by a
    /// single refresh-and-retry.
    AuthExpired,
    /// 401 for any other reason (malformed or revoked credential); never
    /// retried.
    AuthInvalid,
    /// 429; retried after the server-directed or computed delay.
    RateLimited,
    /// Any other 4xx; indicates a caller defect, never retried.
    ClientError,
    /// 5xx; retried with backoff.
    ServerError,
    /// Anything else (missing or out-of-range status with no network
    /// failure); never retried.
    Unknown,
}

impl ErrorKind {
    /// Whether the retry executor may attempt recovery for this kind.
    ///
    /// `AuthExpired` is recovered through credential refresh rather than
    /// backoff, so it reports `false` here.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network | Self::ServerError | Self::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Network => "network",
            Self::AuthExpired => "auth expired",
            Self::AuthInvalid => "auth invalid",
            Self::RateLimited => "rate limited",
            Self::ClientError => "client error",
            Self::ServerError => "server error",
            Self::Unknown => "unknown",
        };
        write!(f, "{label}")
    }
}

/// Error type for all Ghost access-layer operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The admin or content API key is malformed.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// A filter tree violated an encoding invariant.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// The access layer was assembled with missing or inconsistent settings.
    #[error("configuration error: {0}")]
    Config(String),

    /// A dispatched request failed terminally.
    #[error("request failed ({kind}) after {attempts} attempt(s): {message}")]
    Request {
        /// Final classification of the failure.
        kind: ErrorKind,
        /// HTTP status of the last attempt, when one was received.
        status: Option<u16>,
        /// Number of attempts consumed from the retry budget.
        attempts: u32,
        /// True when a retryable kind ran out of attempts.
        attempts_exhausted: bool,
        /// Human-readable summary of the last outcome.
        message: String,
    },
}

impl ApiError {
    /// The classification of a terminal request failure, if this is one.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Request { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether retrying the whole logical call could plausibly succeed.
    ///
    /// Terminal request errors report retryability of their kind (a caller
    /// may escalate an exhausted `ServerError` to a coarser retry loop);
    /// construction-time errors are always permanent.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { kind, .. } => kind.is_retryable(),
            _ => false,
        }
    }
}
