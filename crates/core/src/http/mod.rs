//! HTTP access layer
//!
//! Split into policy-free transport ([`transport`]), pure outcome
//! classification ([`classify`]), and the retrying executor that drives both
//! ([`executor`]). Callers describe calls as [`RequestIntent`] values and
//! receive [`ApiResponse`] or a classified [`ApiError`](crate::ApiError).

pub mod classify;
pub mod executor;
pub mod intent;
pub mod transport;

pub use classify::{classify, Classified};
pub use executor::{ApiExecutor, RetrySettings};
pub use intent::{ApiResponse, ApiScope, RequestIntent};
pub use transport::{AuthCarrier, ReqwestTransport, RequestOutcome, Transport};
