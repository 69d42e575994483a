//! Application layer services.
//!
//! Services coordinate the domain and the broker and provide a clean API for
//! HTTP handlers and startup wiring.
//!
//! # Available Services
//!
//! - [`services::identity_service::IdentityService`] - Mints cookie-backed identities
//! - [`services::store_listener::StoreListener`] - Persists broker events

pub mod services;
