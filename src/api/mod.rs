//! HTTP layer in front of the broker and the recency cache.
//!
//! Handlers only publish events and read the cache; persistence happens in
//! broker listeners.
//!
//! # Modules
//!
//! - [`dto`] - Request and response bodies
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Identity, CORS, rate limiting and tracing layers
//! - [`routes`] - Route configuration and composition

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
