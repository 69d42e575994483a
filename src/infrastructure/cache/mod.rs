//! In-memory caching layer.
//!
//! - [`RecencyCache`] - Per-user ring of recent link copies, fed by the broker

mod recency_cache;

pub use recency_cache::{RECENTS_CAPACITY, RecencyCache};
