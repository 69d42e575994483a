//! Per-user recency cache of link copy events.
//!
//! Temporary state: it lives for the process only and is rebuilt from the
//! event store on startup via [`RecencyCache::warm`].

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::domain::events::{IdentityAction, IdentityEvent, LinkCopyEvent};
use crate::domain::repositories::EventStore;
use crate::error::AppError;
use crate::events::{IdentityListener, LinkCopyListener, ListenerError};

/// Number of slots in each user's ring.
///
/// Counts events written, not distinct URLs.
pub const RECENTS_CAPACITY: usize = 5;

/// Fixed-capacity ring overwriting its oldest slot first.
#[derive(Debug, Default)]
struct RecentRing {
    slots: [Option<LinkCopyEvent>; RECENTS_CAPACITY],
    /// Next slot to write; also the oldest stored event once the ring is full.
    cursor: usize,
}

impl RecentRing {
    fn push(&mut self, event: LinkCopyEvent) {
        self.slots[self.cursor] = Some(event);
        self.cursor = (self.cursor + 1) % RECENTS_CAPACITY;
    }

    /// Stored events, oldest written first.
    fn iter(&self) -> impl Iterator<Item = &LinkCopyEvent> {
        (0..RECENTS_CAPACITY)
            .filter_map(move |offset| self.slots[(self.cursor + offset) % RECENTS_CAPACITY].as_ref())
    }
}

/// Bounded, deduplicated view of each user's most recent link copies.
///
/// A single lock guards both the user map and the rings; readers copy out
/// what they need before it is released.
#[derive(Debug, Default)]
pub struct RecencyCache {
    recents: Mutex<HashMap<String, RecentRing>>,
}

impl RecencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replays stored clicks of unexpired users through [`RecencyCache::record_copy`].
    ///
    /// Returns the number of events replayed.
    ///
    /// # Errors
    ///
    /// Propagates the store's error; the cache is left untouched in that case.
    pub async fn warm(&self, store: &dyn EventStore) -> Result<usize, AppError> {
        let clicks = store.fetch_clicks_for_unexpired_users().await?;

        for click in &clicks {
            self.record_copy(click);
        }

        info!("Hydrated recency cache with {} entries", clicks.len());
        Ok(clicks.len())
    }

    /// Writes a copy event into its user's ring, creating the ring on first use.
    pub fn record_copy(&self, event: &LinkCopyEvent) {
        self.recents
            .lock()
            .entry(event.user_id.clone())
            .or_default()
            .push(event.clone());
    }

    /// Drops all state for the user when the identity expires.
    ///
    /// Other actions are ignored.
    pub fn apply_identity(&self, event: &IdentityEvent) {
        if event.action != IdentityAction::Expired {
            return;
        }

        if self.recents.lock().remove(&event.user_id).is_some() {
            debug!(user_id = %event.user_id, "Evicted expired user from recency cache");
        }
    }

    /// Distinct recently copied URLs for a user, oldest first.
    ///
    /// Duplicate `(user, url)` pairs collapse to their oldest stored occurrence.
    /// An unknown user yields an empty list.
    pub fn recents(&self, user_id: &str) -> Vec<String> {
        let recents = self.recents.lock();
        let Some(ring) = recents.get(user_id) else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut distinct: Vec<&LinkCopyEvent> =
            ring.iter().filter(|event| seen.insert((*event).dedup_key())).collect();
        distinct.sort_by_key(|event| event.happened_at);

        distinct.into_iter().map(|event| event.url.clone()).collect()
    }

    /// Number of users with cached state.
    pub fn len(&self) -> usize {
        self.recents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.recents.lock().is_empty()
    }
}

#[async_trait]
impl LinkCopyListener for RecencyCache {
    fn id(&self) -> &str {
        "recency-cache"
    }

    async fn handle_link_copy(&self, event: &LinkCopyEvent) -> Result<(), ListenerError> {
        self.record_copy(event);
        Ok(())
    }
}

#[async_trait]
impl IdentityListener for RecencyCache {
    fn id(&self) -> &str {
        "recency-cache"
    }

    async fn handle_identity(&self, event: &IdentityEvent) -> Result<(), ListenerError> {
        self.apply_identity(event);
        Ok(())
    }
}
