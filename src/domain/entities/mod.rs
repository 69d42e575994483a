//! Core domain entities.
//!
//! - [`User`] - A cookie-backed pseudonymous identity

pub mod user;

pub use user::User;
