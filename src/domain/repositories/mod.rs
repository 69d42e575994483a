//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for durable storage. Implementations live in
//! `crate::infrastructure::persistence`; mock implementations are generated
//! via `mockall` for unit tests.

pub mod event_store;

pub use event_store::EventStore;

#[cfg(test)]
pub use event_store::MockEventStore;
