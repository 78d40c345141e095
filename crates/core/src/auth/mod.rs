//! Credential handling for the two Ghost trust levels
//!
//! The Content API authenticates with a static key in the query string; the
//! Admin API authenticates with short-lived HS256 JWTs minted from an
//! `id:secret` identity. Key parsing, token minting, and the single-flight
//! token cache live here.

mod cache;
mod keys;
mod token;

pub use cache::{TokenCache, DEFAULT_SAFETY_MARGIN_SECS};
pub use keys::{AdminApiKey, ContentApiKey};
pub use token::{
    default_token_window, mint_admin_token, CachedToken, DEFAULT_TOKEN_WINDOW_SECS,
};
