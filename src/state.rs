//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::IdentityService;
use crate::domain::repositories::EventStore;
use crate::events::Broker;
use crate::infrastructure::cache::RecencyCache;

/// Handles to the long-lived components.
///
/// Handlers publish through `broker` and read from `recents`; they never
/// write to `store` directly.
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
    pub recents: Arc<RecencyCache>,
    pub store: Arc<dyn EventStore>,
    pub identity_service: Arc<IdentityService>,
}

impl AppState {
    pub fn new(
        broker: Arc<Broker>,
        recents: Arc<RecencyCache>,
        store: Arc<dyn EventStore>,
        identity_service: Arc<IdentityService>,
    ) -> Self {
        Self {
            broker,
            recents,
            store,
            identity_service,
        }
    }
}
