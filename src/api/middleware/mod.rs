//! HTTP middleware for request processing and protection.
//!
//! Provides identity extraction, dev-mode CORS, rate limiting, and
//! observability middleware.

pub mod cors;
pub mod identity;
pub mod rate_limit;
pub mod tracing;
