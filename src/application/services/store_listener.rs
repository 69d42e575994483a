//! Broker listener that persists events through an [`EventStore`].
//!
//! The listener itself only enqueues: a background worker owns the store and
//! performs the writes, so database latency never holds up the broker's
//! dispatch loop.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::domain::entities::User;
use crate::domain::events::{Event, IdentityAction, IdentityEvent, LinkCopyEvent};
use crate::domain::repositories::EventStore;
use crate::events::{IdentityListener, LinkCopyListener, ListenerError};

/// Writes every event it receives to durable storage.
///
/// Events are queued for [`run_store_worker`]. When the queue is full the
/// event is dropped and [`ListenerError::StoreQueueFull`] goes back to the
/// broker, which logs it. Storage failures are logged by the worker.
pub struct StoreListener {
    tx: Mutex<Option<mpsc::Sender<Event>>>,
}

impl StoreListener {
    /// Starts the write worker and returns the listener feeding it.
    ///
    /// The worker stops once [`StoreListener::close`] has been called and the
    /// queue is drained.
    pub fn spawn<S>(store: Arc<S>, capacity: usize) -> (Self, JoinHandle<()>)
    where
        S: EventStore + ?Sized + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity);
        let worker = tokio::spawn(run_store_worker(rx, store));

        (
            Self {
                tx: Mutex::new(Some(tx)),
            },
            worker,
        )
    }

    /// Stops accepting events; already queued events are still written.
    pub fn close(&self) {
        self.tx.lock().take();
    }

    fn enqueue(&self, event: Event) -> Result<(), ListenerError> {
        let tx = self.tx.lock().clone().ok_or(ListenerError::StoreClosed)?;

        tx.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => ListenerError::StoreQueueFull,
            TrySendError::Closed(_) => ListenerError::StoreClosed,
        })
    }
}

#[async_trait]
impl LinkCopyListener for StoreListener {
    fn id(&self) -> &str {
        "store-listener"
    }

    async fn handle_link_copy(&self, event: &LinkCopyEvent) -> Result<(), ListenerError> {
        self.enqueue(event.clone().into())
    }
}

#[async_trait]
impl IdentityListener for StoreListener {
    fn id(&self) -> &str {
        "store-listener"
    }

    async fn handle_identity(&self, event: &IdentityEvent) -> Result<(), ListenerError> {
        if let IdentityAction::Unknown(action) = &event.action {
            return Err(ListenerError::UnknownIdentityAction(action.clone()));
        }

        self.enqueue(event.clone().into())
    }
}

/// Drains the queue into the store until every sender is gone.
pub async fn run_store_worker<S>(mut rx: mpsc::Receiver<Event>, store: Arc<S>)
where
    S: EventStore + ?Sized,
{
    while let Some(event) = rx.recv().await {
        if let Err(e) = persist_event(store.as_ref(), &event).await {
            warn!(
                listener = "store-listener",
                event = event.kind(),
                error = %e,
                "Failed to persist event"
            );
        }
    }
}

/// Writes one event.
///
/// - Link copy: append the event.
/// - Created: save the user, then append the event.
/// - Expired: expire the user, then append the event. Nothing is appended if
///   expiring fails.
///
/// # Errors
///
/// [`ListenerError::UnknownIdentityAction`] for actions outside the known set,
/// [`ListenerError::Storage`] for store failures.
pub async fn persist_event<S>(store: &S, event: &Event) -> Result<(), ListenerError>
where
    S: EventStore + ?Sized,
{
    let event = match event {
        Event::LinkCopy(event) => {
            store.save_link_copy_event(event).await?;
            return Ok(());
        }
        Event::Identity(event) => event,
    };

    match &event.action {
        IdentityAction::Created { expires_at } => {
            let user = User::new(event.user_id.clone(), event.happened_at, *expires_at);
            store.save_user(&user).await?;
        }
        IdentityAction::Expired => {
            store.expire_user(&event.user_id).await?;
        }
        IdentityAction::Unknown(action) => {
            return Err(ListenerError::UnknownIdentityAction(action.clone()));
        }
    }

    store.save_identity_event(event).await?;
    Ok(())
}
