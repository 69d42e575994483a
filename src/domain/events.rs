//! Event model shared by producers (HTTP handlers) and listeners.
//!
//! Events are immutable values stamped with the time they happened. They are
//! moved into the [`crate::events::Broker`] and handed to listeners by
//! reference.

use chrono::{DateTime, Utc};
use std::fmt;

/// A link was copied on the front end.
///
/// An empty `user_id` means the visitor has no identity cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkCopyEvent {
    pub happened_at: DateTime<Utc>,
    pub user_id: String,
    pub url: String,
}

impl LinkCopyEvent {
    /// Creates an event stamped with the current time.
    pub fn new(user_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self::at(Utc::now(), user_id, url)
    }

    /// Creates an event with an explicit timestamp.
    ///
    /// Used when replaying stored events.
    pub fn at(happened_at: DateTime<Utc>, user_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            happened_at,
            user_id: user_id.into(),
            url: url.into(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_empty()
    }

    /// Key under which two copy events count as the same copy.
    ///
    /// Excludes the timestamp.
    pub fn dedup_key(&self) -> (&str, &str) {
        (&self.user_id, &self.url)
    }
}

/// Lifecycle transition of a cookie-backed identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityAction {
    /// A new identity was minted and expires at the given time.
    Created { expires_at: DateTime<Utc> },
    /// The identity was expired and its state should be forgotten.
    Expired,
    /// Any action outside the known set, kept verbatim so listeners can report it.
    Unknown(String),
}

impl IdentityAction {
    /// Text stored in the `identity_events.action` column.
    pub fn as_str(&self) -> &str {
        match self {
            IdentityAction::Created { .. } => "created",
            IdentityAction::Expired => "expired",
            IdentityAction::Unknown(action) => action,
        }
    }
}

impl fmt::Display for IdentityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user identity changed state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityEvent {
    pub happened_at: DateTime<Utc>,
    pub user_id: String,
    pub action: IdentityAction,
}

impl IdentityEvent {
    pub fn new(user_id: impl Into<String>, action: IdentityAction) -> Self {
        Self {
            happened_at: Utc::now(),
            user_id: user_id.into(),
            action,
        }
    }

    pub fn created(user_id: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self::new(user_id, IdentityAction::Created { expires_at })
    }

    pub fn expired(user_id: impl Into<String>) -> Self {
        Self::new(user_id, IdentityAction::Expired)
    }
}

/// Any event the broker can carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    LinkCopy(LinkCopyEvent),
    Identity(IdentityEvent),
}

impl Event {
    /// Short name of the event type, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::LinkCopy(_) => "link_copy",
            Event::Identity(_) => "identity",
        }
    }
}

impl From<LinkCopyEvent> for Event {
    fn from(event: LinkCopyEvent) -> Self {
        Event::LinkCopy(event)
    }
}

impl From<IdentityEvent> for Event {
    fn from(event: IdentityEvent) -> Self {
        Event::Identity(event)
    }
}
