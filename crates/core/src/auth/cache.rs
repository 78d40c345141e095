//! Per-identity token cache with single-flight refresh
//!
//! Holds at most one live [`CachedToken`] for its [`AdminApiKey`]. All reads
//! and refreshes serialize through one async mutex: when the slot is empty
//! or the cached token is inside the safety margin of expiry, exactly one
//! caller mints while the rest wait for the lock and then observe the fresh
//! token. The mint itself never suspends, so a caller abandoned mid-wait
//! cannot leave the slot half-populated.
//!
//! Each identity owns its own `TokenCache`; independent identities never
//! share state and refresh independently.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use super::keys::AdminApiKey;
use super::token::{default_token_window, mint_admin_token, CachedToken};
use crate::error::ApiError;

/// Default buffer subtracted from nominal expiry to force proactive renewal,
/// in seconds.
pub const DEFAULT_SAFETY_MARGIN_SECS: i64 = 60;

/// Single-identity credential cache.
pub struct TokenCache {
    key: AdminApiKey,
    window: TimeDelta,
    safety_margin: TimeDelta,
    slot: Mutex<Option<CachedToken>>,
    mints: AtomicU64,
}

impl TokenCache {
    /// Create a cache with the default 300s window and 60s safety margin.
    #[must_use]
    pub fn new(key: AdminApiKey) -> Self {
        Self::with_timing(key, default_token_window(), TimeDelta::seconds(DEFAULT_SAFETY_MARGIN_SECS))
    }

    /// Create a cache with explicit validity window and safety margin.
    #[must_use]
    pub fn with_timing(key: AdminApiKey, window: TimeDelta, safety_margin: TimeDelta) -> Self {
        Self { key, window, safety_margin, slot: Mutex::new(None), mints: AtomicU64::new(0) }
    }

    /// Get the current valid token, minting a fresh one when none is cached
    /// or the cached token is within the safety margin of expiry.
    ///
    /// Concurrent callers are single-flighted: at most one mint executes and
    /// every waiter receives its result.
    ///
    /// # Errors
    /// Returns `ApiError::InvalidCredential` if the identity's secret cannot
    /// be used to sign.
    pub async fn current(&self, now: DateTime<Utc>) -> Result<CachedToken, ApiError> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = slot.as_ref() {
            if token.expires_at - now > self.safety_margin {
                debug!(key_id = self.key.key_id(), "using cached admin token");
                return Ok(token.clone());
            }
        }

        let token = mint_admin_token(&self.key, now, self.window)?;
        self.mints.fetch_add(1, Ordering::Relaxed);
        debug!(
            key_id = self.key.key_id(),
            expires_at = %token.expires_at,
            "minted fresh admin token"
        );

        *slot = Some(token.clone());
        Ok(token)
    }

    /// Forcibly discard the cached token.
    ///
    /// Used after an `AuthInvalid` classification so a token the server has
    /// rejected for reasons other than expiry is never presented again.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
        debug!(key_id = self.key.key_id(), "admin token cache invalidated");
    }

    /// Number of mint operations performed over the cache's lifetime.
    #[must_use]
    pub fn mint_count(&self) -> u64 {
        self.mints.load(Ordering::Relaxed)
    }

    /// Public identifier of the cached identity.
    #[must_use]
    pub fn key_id(&self) -> &str {
        self.key.key_id()
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::cache.
    use std::sync::Arc;

    use futures::future::join_all;

    use super::*;

    const VALID_KEY: &str = "64f8a1b2c3d4e5f60718293a:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    const OTHER_KEY: &str = "a1b2c3d4e5f60718293a64f8:fedcba9876543210fedcba9876543210fedcba9876543210fedcba9876543210";

    fn cache() -> TokenCache {
        TokenCache::new(AdminApiKey::parse(VALID_KEY).unwrap())
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    /// Validates the single-flight guarantee under concurrent callers.
    ///
    /// Assertions:
    /// - Confirms exactly one mint occurs for N concurrent requests.
    /// - Confirms every caller receives the same token value.
    #[tokio::test]
    async fn test_concurrent_callers_share_one_mint() {
        let cache = Arc::new(cache());
        let now = fixed_now();

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.current(now).await.unwrap().value })
            })
            .collect();

        let values: Vec<String> =
            join_all(tasks).await.into_iter().map(|r| r.unwrap()).collect();

        assert_eq!(cache.mint_count(), 1);
        assert!(values.windows(2).all(|w| w[0] == w[1]));
    }

    /// Validates the cache-hit path away from expiry.
    ///
    /// Assertions:
    /// - Confirms a second request shortly after the first does not re-mint.
    #[tokio::test]
    async fn test_fresh_token_is_reused() {
        let cache = cache();
        let now = fixed_now();

        let first = cache.current(now).await.unwrap();
        let second = cache.current(now + TimeDelta::seconds(30)).await.unwrap();

        assert_eq!(first.value, second.value);
        assert_eq!(cache.mint_count(), 1);
    }

    /// Validates proactive replacement inside the safety margin.
    ///
    /// Assertions:
    /// - Confirms a token with 30s of life left (margin 60s) is replaced
    ///   rather than handed out.
    /// - Confirms the replacement's expiry is beyond the margin again.
    #[tokio::test]
    async fn test_near_expiry_triggers_remint() {
        let cache = cache();
        let now = fixed_now();

        let first = cache.current(now).await.unwrap();

        // 270s later the token has 30s left, inside the 60s margin.
        let later = now + TimeDelta::seconds(270);
        let second = cache.current(later).await.unwrap();

        assert_ne!(first.value, second.value);
        assert_eq!(cache.mint_count(), 2);
        assert!(second.seconds_until_expiry(later) > DEFAULT_SAFETY_MARGIN_SECS);
    }

    /// Validates `invalidate` discards the cached token.
    ///
    /// Assertions:
    /// - Confirms the next request after invalidation mints again even
    ///   though the old token was still valid.
    #[tokio::test]
    async fn test_invalidate_forces_remint() {
        let cache = cache();
        let now = fixed_now();

        cache.current(now).await.unwrap();
        cache.invalidate().await;
        cache.current(now + TimeDelta::seconds(1)).await.unwrap();

        assert_eq!(cache.mint_count(), 2);
    }

    /// Validates that independent identities cache independently.
    ///
    /// Assertions:
    /// - Confirms each cache mints its own token.
    /// - Confirms the tokens differ.
    #[tokio::test]
    async fn test_identities_do_not_share_state() {
        let a = TokenCache::new(AdminApiKey::parse(VALID_KEY).unwrap());
        let b = TokenCache::new(AdminApiKey::parse(OTHER_KEY).unwrap());
        let now = fixed_now();

        let token_a = a.current(now).await.unwrap();
        let token_b = b.current(now).await.unwrap();

        assert_ne!(token_a.value, token_b.value);
        assert_eq!(a.mint_count(), 1);
        assert_eq!(b.mint_count(), 1);
    }
}
