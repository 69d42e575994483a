//! Utility functions for request handling.
//!
//! - [`cookie`] - Identity cookie parsing and formatting

pub mod cookie;
