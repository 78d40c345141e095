//! Short-lived signed token minting for the Admin API
//!
//! Tokens are HS256 JWTs binding three claims: `iat` (mint time), `exp`
//! (mint time plus the configured window, 300s by default), and the fixed
//! audience `/admin/` identifying the privileged surface. The key id rides
//! in the `kid` header so the remote verifier can select the matching
//! secret.
//!
//! Minting is pure with respect to the supplied `now`: the same identity and
//! timestamp always produce the identical token, which keeps the signer
//! trivially testable.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use super::keys::AdminApiKey;
use crate::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

/// Audience claim marking tokens for the privileged API surface.
const ADMIN_AUDIENCE: &str = "/admin/";

/// Default validity window for minted tokens, in seconds.
pub const DEFAULT_TOKEN_WINDOW_SECS: i64 = 300;

/// Default validity window for minted tokens.
#[must_use]
pub fn default_token_window() -> TimeDelta {
    TimeDelta::seconds(DEFAULT_TOKEN_WINDOW_SECS)
}

/// A minted signed token with its validity bounds.
///
/// Replaced wholesale on refresh, never mutated; holds no secret material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// The opaque signed artifact, ready for an `Authorization: Ghost ...`
    /// header.
    pub value: String,
    /// Mint timestamp.
    pub issued_at: DateTime<Utc>,
    /// Hard expiry; callers receive the token only while comfortably inside
    /// this bound.
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Seconds remaining until hard expiry at `now` (negative once past).
    #[must_use]
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds()
    }
}

#[derive(Serialize)]
struct Header<'a> {
    alg: &'static str,
    typ: &'static str,
    kid: &'a str,
}

#[derive(Serialize)]
struct Claims<'a> {
    iat: i64,
    exp: i64,
    aud: &'a str,
}

/// Mint a signed Admin API token valid for `window` starting at `now`.
///
/// # Errors
/// Returns `ApiError::InvalidCredential` if the identity's secret does not
/// decode to the expected byte form.
pub fn mint_admin_token(
    key: &AdminApiKey,
    now: DateTime<Utc>,
    window: TimeDelta,
) -> Result<CachedToken, ApiError> {
    let secret = key.secret_bytes()?;

    let issued_at = now;
    let expires_at = now + window;

    let header = Header { alg: "HS256", typ: "JWT", kid: key.key_id() };
    let claims = Claims { iat: issued_at.timestamp(), exp: expires_at.timestamp(), aud: ADMIN_AUDIENCE };

    let header_b64 = URL_SAFE_NO_PAD.encode(encode_json(&header)?);
    let claims_b64 = URL_SAFE_NO_PAD.encode(encode_json(&claims)?);
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = HmacSha256::new_from_slice(&secret).map_err(|_| {
        ApiError::InvalidCredential("admin secret is not usable as HMAC key material".to_string())
    })?;
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(CachedToken { value: format!("{signing_input}.{signature}"), issued_at, expires_at })
}

fn encode_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(value)
        .map_err(|e| ApiError::InvalidCredential(format!("token encoding failed: {e}")))
}
