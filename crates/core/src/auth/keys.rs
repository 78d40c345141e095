//! API key identities for the two Ghost trust levels
//!
//! - [`AdminApiKey`]: the privileged identity, supplied once as `id:secret`;
//!   the secret signs short-lived JWTs and is never logged or printed.
//! - [`ContentApiKey`]: the public read-only key, passed as a query
//!   parameter.
//!
//! Parsing checks the wire shape; the strict hex requirements of the remote
//! verifier (24-hex key id, 64-hex secret) are enforced when the secret is
//! actually used to sign, matching where the remote API itself would reject
//! them.

use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Length in characters of a well-formed admin key id (hex).
const ADMIN_KEY_ID_LEN: usize = 24;
/// Length in characters of a well-formed admin secret (hex, 32 bytes).
const ADMIN_SECRET_LEN: usize = 64;
/// Length in characters of a well-formed content key (hex).
const CONTENT_KEY_LEN: usize = 26;

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Privileged Admin API identity: an opaque `(key_id, secret)` pair.
///
/// The key id is embedded in minted tokens as the `kid` header so the remote
/// verifier can select the matching secret; the secret never leaves this
/// struct except as HMAC key material.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminApiKey {
    key_id: String,
    secret: String,
}

impl AdminApiKey {
    /// Parse the `id:secret` wire form.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidCredential` if the separator is missing or
    /// either half is empty.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let (key_id, secret) = raw.split_once(':').ok_or_else(|| {
            ApiError::InvalidCredential("admin API key must be in 'id:secret' format".to_string())
        })?;

        if key_id.is_empty() || secret.is_empty() {
            return Err(ApiError::InvalidCredential(
                "admin API key id and secret must be non-empty".to_string(),
            ));
        }

        Ok(Self { key_id: key_id.to_string(), secret: secret.to_string() })
    }

    /// Public identifier half of the credential, safe to log.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Whether the key matches the strict format the remote verifier
    /// documents: 24-char hex id and 64-char hex secret.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.key_id.len() == ADMIN_KEY_ID_LEN
            && is_hex(&self.key_id)
            && self.secret.len() == ADMIN_SECRET_LEN
            && is_hex(&self.secret)
    }

    /// Decode the secret into HMAC key material.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidCredential` if the secret is not valid hex
    /// of the expected length.
    pub(crate) fn secret_bytes(&self) -> Result<Vec<u8>, ApiError> {
        if self.secret.len() != ADMIN_SECRET_LEN {
            return Err(ApiError::InvalidCredential(format!(
                "admin secret must be {ADMIN_SECRET_LEN} hex characters, got {}",
                self.secret.len()
            )));
        }
        hex::decode(&self.secret).map_err(|_| {
            ApiError::InvalidCredential("admin secret is not valid hex".to_string())
        })
    }
}

impl FromStr for AdminApiKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Secrets must never reach logs; only the key id is printed.
impl fmt::Debug for AdminApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminApiKey")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Public Content API key, sent as the `key` query parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentApiKey(String);

impl ContentApiKey {
    /// Accept any non-empty key; strict format is advisory only.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidCredential` if the key is empty.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        if raw.is_empty() {
            return Err(ApiError::InvalidCredential(
                "content API key must be non-empty".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Whether the key matches the documented 26-char hex format.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == CONTENT_KEY_LEN && is_hex(&self.0)
    }

    /// The raw key value, for embedding as a query parameter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ContentApiKey {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ContentApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContentApiKey").field(&"<redacted>").finish()
    }
}
