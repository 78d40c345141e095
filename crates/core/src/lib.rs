//! Typed access layer for the Ghost CMS HTTP APIs.
//!
//! Ghost exposes two surfaces per site: the public, read-only Content API
//! and the privileged Admin API. This crate gives host applications one
//! coherent way to call both:
//!
//! - [`auth`]: credential parsing, short-lived admin token minting, and a
//!   single-flight token cache.
//! - [`nql`]: a typed filter tree with a deterministic encoder for Ghost's
//!   NQL query language.
//! - [`http`]: a policy-free transport, a pure failure classifier, and the
//!   retrying executor that ties the layer together.
//! - [`config`]: plain-data configuration with validation and one-call
//!   wiring into a ready executor.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod nql;

pub use auth::{AdminApiKey, ContentApiKey, TokenCache};
pub use config::{GhostConfig, GhostConfigBuilder, RetryConfig};
pub use error::{ApiError, ErrorKind};
pub use http::{ApiExecutor, ApiResponse, ApiScope, RequestIntent, RetrySettings};
pub use nql::Filter;
