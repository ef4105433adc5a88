//! Per-tier request rate limiting
//!
//! The design API documents a separate request ceiling for each class of
//! endpoint ("tier"). Each tier gets its own [`RateLimiter`]; limiters never
//! interact, so requests on different tiers proceed independently.

pub mod limiter;

pub use limiter::{DrainState, RateLimiter};
