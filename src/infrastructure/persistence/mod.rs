//! PostgreSQL repository implementations.
//!
//! # Repositories
//!
//! - [`PgEventStore`] - Users, link copy events, and identity events

pub mod pg_event_store;

pub use pg_event_store::PgEventStore;
