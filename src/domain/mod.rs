//! Domain layer containing the event model, entities, and repository contracts.
//!
//! # Architecture
//!
//! - [`events`] - Immutable event values carried by the broker
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//!
//! # Event Flow
//!
//! 1. HTTP handler builds a [`events::LinkCopyEvent`] or [`events::IdentityEvent`]
//! 2. The event is published to [`crate::events::Broker`]
//! 3. The broker hands it to every registered listener, one at a time
//! 4. Listeners update the recency cache and persist via [`repositories::EventStore`]

pub mod entities;
pub mod events;
pub mod repositories;
