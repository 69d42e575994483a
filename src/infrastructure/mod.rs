//! Infrastructure layer for state and storage.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`cache`] - In-memory recency cache
//! - [`persistence`] - PostgreSQL event store

pub mod cache;
pub mod persistence;
