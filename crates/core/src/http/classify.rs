//! Transport outcome classification
//!
//! Maps a raw [`RequestOutcome`] onto the closed [`ErrorKind`] set the retry
//! executor drives on. Classification is a pure decision table over the
//! status code, the normalized error code, and the `Retry-After` header;
//! everything the executor needs is decided here, in one place.

use std::time::Duration;

use crate::error::ErrorKind;
use crate::http::transport::RequestOutcome;

/// A classified failure: the kind, plus the server's requested wait when it
/// sent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classified {
    /// Failure category.
    pub kind: ErrorKind,
    /// Parsed `Retry-After` delay, when present and well-formed.
    pub retry_after: Option<Duration>,
}

impl Classified {
    fn kind(kind: ErrorKind) -> Self {
        Self { kind, retry_after: None }
    }
}

/// Whether a 401's error code marks the credential as stale rather than
/// wrong. Ghost reports expiry through the error envelope's code/type.
fn is_stale_credential(outcome: &RequestOutcome) -> bool {
    outcome
        .error_code
        .as_deref()
        .is_some_and(|code| code.contains("expired") || code.contains("stale"))
}

fn parse_retry_after(outcome: &RequestOutcome) -> Option<Duration> {
    let raw = outcome.headers.get("retry-after")?;
    let seconds: u64 = raw.trim().parse().ok()?;
    Some(Duration::from_secs(seconds))
}

/// Classifies a completed (or failed) transport exchange.
///
/// Success statuses return `None`; everything else maps to exactly one
/// [`ErrorKind`]:
///
/// - network-level failure → [`ErrorKind::Network`]
/// - 401 with a stale/expired error code → [`ErrorKind::AuthExpired`]
/// - 401 otherwise → [`ErrorKind::AuthInvalid`]
/// - 429 → [`ErrorKind::RateLimited`], carrying `Retry-After` when parseable
/// - other 4xx (403 included) → [`ErrorKind::ClientError`]
/// - 5xx → [`ErrorKind::ServerError`]
/// - anything else → [`ErrorKind::Unknown`]
#[must_use]
pub fn classify(outcome: &RequestOutcome) -> Option<Classified> {
    if outcome.network_failed {
        return Some(Classified::kind(ErrorKind::Network));
    }

    match outcome.status {
        200..=299 => None,
        401 if is_stale_credential(outcome) => Some(Classified::kind(ErrorKind::AuthExpired)),
        401 => Some(Classified::kind(ErrorKind::AuthInvalid)),
        429 => Some(Classified {
            kind: ErrorKind::RateLimited,
            retry_after: parse_retry_after(outcome),
        }),
        400..=499 => Some(Classified::kind(ErrorKind::ClientError)),
        500..=599 => Some(Classified::kind(ErrorKind::ServerError)),
        _ => Some(Classified::kind(ErrorKind::Unknown)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn outcome(status: u16) -> RequestOutcome {
        RequestOutcome {
            status,
            headers: BTreeMap::new(),
            body: serde_json::Value::Null,
            error_code: None,
            message: None,
            network_failed: false,
        }
    }

    /// Validates `classify` behavior for the status-range decision table.
    ///
    /// Assertions:
    /// - Ensures 2xx statuses classify as success.
    /// - Ensures each failure range maps to its documented kind.
    #[test]
    fn maps_status_ranges() {
        assert!(classify(&outcome(200)).is_none());
        assert!(classify(&outcome(204)).is_none());

        let cases = [
            (404, ErrorKind::ClientError),
            (422, ErrorKind::ClientError),
            (429, ErrorKind::RateLimited),
            (500, ErrorKind::ServerError),
            (503, ErrorKind::ServerError),
            (300, ErrorKind::Unknown),
        ];
        for (status, kind) in cases {
            assert_eq!(classify(&outcome(status)).unwrap().kind, kind);
        }
    }

    /// Validates `classify` behavior for the forbidden-response scenario.
    ///
    /// Assertions:
    /// - Ensures a 403 falls into the generic 4xx arm as `ClientError`, not
    ///   a credential failure; only 401 concerns the credential itself.
    #[test]
    fn forbidden_is_a_client_error() {
        let classified = classify(&outcome(403)).unwrap();
        assert_eq!(classified.kind, ErrorKind::ClientError);
        assert!(!classified.kind.is_retryable());
    }

    /// Validates `classify` behavior for the stale-versus-invalid 401
    /// scenario.
    ///
    /// Assertions:
    /// - Ensures a 401 with an expiry error code classifies as `AuthExpired`.
    /// - Ensures a bare 401 classifies as `AuthInvalid`.
    #[test]
    fn distinguishes_stale_from_invalid_auth() {
        let mut stale = outcome(401);
        stale.error_code = Some("token_expired".to_string());
        assert_eq!(classify(&stale).unwrap().kind, ErrorKind::AuthExpired);

        let mut stale = outcome(401);
        stale.error_code = Some("stale_token".to_string());
        assert_eq!(classify(&stale).unwrap().kind, ErrorKind::AuthExpired);

        let mut invalid = outcome(401);
        invalid.error_code = Some("unauthorized".to_string());
        assert_eq!(classify(&invalid).unwrap().kind, ErrorKind::AuthInvalid);
        assert_eq!(classify(&outcome(401)).unwrap().kind, ErrorKind::AuthInvalid);
    }

    /// Validates `classify` behavior for the `Retry-After` parsing scenario.
    ///
    /// Assertions:
    /// - Ensures a numeric `Retry-After` on a 429 surfaces as a duration.
    /// - Confirms a malformed header degrades to `None` rather than failing.
    #[test]
    fn parses_retry_after_on_429() {
        let mut limited = outcome(429);
        limited
            .headers
            .insert("retry-after".to_string(), "7".to_string());
        let classified = classify(&limited).unwrap();
        assert_eq!(classified.kind, ErrorKind::RateLimited);
        assert_eq!(classified.retry_after, Some(Duration::from_secs(7)));

        let mut malformed = outcome(429);
        malformed
            .headers
            .insert("retry-after".to_string(), "soon".to_string());
        assert_eq!(classify(&malformed).unwrap().retry_after, None);
    }

    /// Validates `classify` behavior for the network failure scenario.
    ///
    /// Assertions:
    /// - Ensures a transport-level failure classifies as `Network` regardless
    ///   of any status placeholder.
    #[test]
    fn network_failure_wins() {
        let mut failed = outcome(0);
        failed.network_failed = true;
        assert_eq!(classify(&failed).unwrap().kind, ErrorKind::Network);
    }
}
