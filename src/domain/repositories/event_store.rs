//! Repository trait for the durable event sink.

use crate::domain::entities::User;
use crate::domain::events::{IdentityEvent, LinkCopyEvent};
use crate::error::AppError;
use async_trait::async_trait;

/// Durable storage for users and the events that concern them.
///
/// Every operation is fallible. Callers inside the broker log failures and
/// carry on; nothing here may affect the dispatch loop or the recency cache.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgEventStore`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a newly minted identity.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Database`] on database errors, including an id
    /// that already exists.
    async fn save_user(&self, user: &User) -> Result<(), AppError>;

    /// Appends a link copy event.
    async fn save_link_copy_event(&self, event: &LinkCopyEvent) -> Result<(), AppError>;

    /// Appends an identity lifecycle event.
    async fn save_identity_event(&self, event: &IdentityEvent) -> Result<(), AppError>;

    /// Marks an identity as expired as of now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no user has the given id.
    async fn expire_user(&self, user_id: &str) -> Result<(), AppError>;

    /// Returns every link copy made by a user that has not yet expired,
    /// oldest first.
    ///
    /// Used once at startup to warm the recency cache.
    async fn fetch_clicks_for_unexpired_users(&self) -> Result<Vec<LinkCopyEvent>, AppError>;

    /// Checks that the backing store is reachable.
    async fn health_check(&self) -> bool;
}
