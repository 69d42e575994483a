//! Listener contracts for the event broker.

use async_trait::async_trait;

use crate::domain::events::{IdentityEvent, LinkCopyEvent};
use crate::error::AppError;

/// Failure reported by a listener while handling one event.
///
/// The broker logs these and moves on. They never reach the publisher.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("unknown identity action {0:?}")]
    UnknownIdentityAction(String),

    #[error("storage failure: {0}")]
    Storage(#[from] AppError),

    #[error("store queue is full, event dropped")]
    StoreQueueFull,

    #[error("store queue is closed")]
    StoreClosed,
}

/// Receives every accepted [`LinkCopyEvent`].
///
/// `id` is the registry key: registering a second listener with the same id
/// replaces the first.
#[async_trait]
pub trait LinkCopyListener: Send + Sync {
    fn id(&self) -> &str;

    async fn handle_link_copy(&self, event: &LinkCopyEvent) -> Result<(), ListenerError>;
}

/// Receives every accepted [`IdentityEvent`].
#[async_trait]
pub trait IdentityListener: Send + Sync {
    fn id(&self) -> &str;

    async fn handle_identity(&self, event: &IdentityEvent) -> Result<(), ListenerError>;
}
