//! In-process event broker.
//!
//! The broker decouples producers (HTTP handlers) from listeners (the recency
//! cache and the store listener). Each event type has its own single-consumer
//! queue; a single dispatch loop ([`Broker::run`]) drains both queues and calls
//! every registered listener for the event's type, one at a time.
//!
//! # Handoff
//!
//! [`Broker::publish`] is a rendezvous: the event travels with a one-shot
//! acknowledgement that the dispatch loop completes as soon as it takes the
//! event off the queue. A publisher therefore returns only once its event has
//! been accepted, and an accepted event is always dispatched. Producers that
//! must not wait spawn the publish onto their own task.
//!
//! # Ordering
//!
//! - Events of one type are dispatched in the order they were accepted.
//! - Nothing is guaranteed between the two event types, except that when both
//!   queues have work the loop alternates between them.
//! - Listener order within one event is unspecified.
//!
//! # Failure
//!
//! Listener errors are logged and isolated: no retry, no propagation to the
//! publisher, and the remaining listeners still receive the event.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::events::{Event, IdentityEvent, LinkCopyEvent};
use crate::events::listener::{IdentityListener, LinkCopyListener};

/// Errors surfaced to publishers and to the task driving [`Broker::run`].
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("event broker is not accepting events")]
    Closed,

    #[error("timed out after {after:?} waiting for the dispatch loop to accept a {kind} event")]
    Timeout { kind: &'static str, after: Duration },

    #[error("dispatch loop is already running")]
    AlreadyRunning,
}

/// Broker tuning.
#[derive(Debug, Clone, Default)]
pub struct BrokerConfig {
    /// Upper bound on how long [`Broker::publish`] waits for acceptance.
    ///
    /// `None` waits indefinitely.
    pub publish_timeout: Option<Duration>,
}

struct Envelope<E> {
    event: E,
    accepted: oneshot::Sender<()>,
}

struct Queues {
    link_copy: mpsc::Receiver<Envelope<LinkCopyEvent>>,
    identity: mpsc::Receiver<Envelope<IdentityEvent>>,
}

enum Next {
    LinkCopy(Envelope<LinkCopyEvent>),
    Identity(Envelope<IdentityEvent>),
}

impl Queues {
    /// Waits for the next event from either queue.
    ///
    /// When both are ready, the queue named by `identity_first` wins. `None`
    /// once both queues are closed.
    async fn next(&mut self, identity_first: bool) -> Option<Next> {
        let Queues {
            link_copy,
            identity,
        } = self;

        if identity_first {
            tokio::select! {
                biased;

                Some(envelope) = identity.recv() => Some(Next::Identity(envelope)),
                Some(envelope) = link_copy.recv() => Some(Next::LinkCopy(envelope)),
                else => None,
            }
        } else {
            tokio::select! {
                biased;

                Some(envelope) = link_copy.recv() => Some(Next::LinkCopy(envelope)),
                Some(envelope) = identity.recv() => Some(Next::Identity(envelope)),
                else => None,
            }
        }
    }
}

/// Single dispatch point between event producers and listeners.
///
/// Constructed once at startup and shared as `Arc<Broker>`.
pub struct Broker {
    link_copy_tx: mpsc::Sender<Envelope<LinkCopyEvent>>,
    identity_tx: mpsc::Sender<Envelope<IdentityEvent>>,
    queues: Mutex<Option<Queues>>,
    link_copy_listeners: RwLock<HashMap<String, Arc<dyn LinkCopyListener>>>,
    identity_listeners: RwLock<HashMap<String, Arc<dyn IdentityListener>>>,
    stop: watch::Sender<bool>,
    running: AtomicBool,
    publish_timeout: Option<Duration>,
}

impl Broker {
    pub fn new(config: BrokerConfig) -> Self {
        // A one-slot queue plus the acceptance ack keeps publishers in lockstep
        // with the dispatch loop.
        let (link_copy_tx, link_copy) = mpsc::channel(1);
        let (identity_tx, identity) = mpsc::channel(1);
        let (stop, _) = watch::channel(false);

        Self {
            link_copy_tx,
            identity_tx,
            queues: Mutex::new(Some(Queues {
                link_copy,
                identity,
            })),
            link_copy_listeners: RwLock::new(HashMap::new()),
            identity_listeners: RwLock::new(HashMap::new()),
            stop,
            running: AtomicBool::new(false),
            publish_timeout: config.publish_timeout,
        }
    }

    /// Registers a link copy listener, replacing any listener with the same id.
    ///
    /// Listeners only see events accepted after registration; there is no replay.
    pub fn register_link_copy_listener(&self, listener: Arc<dyn LinkCopyListener>) {
        let id = listener.id().to_string();
        debug!(listener = %id, "Registered link copy listener");
        self.link_copy_listeners.write().insert(id, listener);
    }

    /// Registers an identity listener, replacing any listener with the same id.
    pub fn register_identity_listener(&self, listener: Arc<dyn IdentityListener>) {
        let id = listener.id().to_string();
        debug!(listener = %id, "Registered identity listener");
        self.identity_listeners.write().insert(id, listener);
    }

    /// Ids of the registered link copy listeners, sorted.
    pub fn link_copy_listener_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.link_copy_listeners.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Ids of the registered identity listeners, sorted.
    pub fn identity_listener_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.identity_listeners.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Whether the dispatch loop is currently consuming events.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Hands an event to the dispatch loop and waits until it is accepted.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Closed`] if the dispatch loop has stopped.
    /// - [`BrokerError::Timeout`] if a publish timeout is configured and the
    ///   loop did not accept the event in time.
    pub async fn publish(&self, event: impl Into<Event>) -> Result<(), BrokerError> {
        let event = event.into();
        let kind = event.kind();

        let handoff = async {
            match event {
                Event::LinkCopy(event) => hand_off(&self.link_copy_tx, event).await,
                Event::Identity(event) => hand_off(&self.identity_tx, event).await,
            }
        };

        match self.publish_timeout {
            Some(after) => tokio::time::timeout(after, handoff)
                .await
                .map_err(|_| BrokerError::Timeout { kind, after })?,
            None => handoff.await,
        }
    }

    /// Publishes on a separate task so the caller never waits for acceptance.
    ///
    /// Failures are logged; the returned handle is only useful to tests.
    pub fn spawn_publish(self: &Arc<Self>, event: impl Into<Event>) -> JoinHandle<()> {
        let broker = Arc::clone(self);
        let event = event.into();

        tokio::spawn(async move {
            let kind = event.kind();
            if let Err(e) = broker.publish(event).await {
                error!(event = kind, error = %e, "Failed to publish event");
            }
        })
    }

    /// Runs the dispatch loop until [`Broker::shutdown`] is called.
    ///
    /// Spawn this exactly once, before any producer can publish.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::AlreadyRunning`] if the loop was already started.
    pub async fn run(&self) -> Result<(), BrokerError> {
        let Some(mut queues) = self.queues.lock().take() else {
            return Err(BrokerError::AlreadyRunning);
        };

        let mut stop = self.stop.subscribe();
        self.running.store(true, Ordering::SeqCst);
        info!("Event broker dispatch loop started");

        // Flipped after every event so a busy queue cannot starve the other.
        let mut identity_first = false;

        loop {
            if *stop.borrow_and_update() {
                break;
            }

            let next = tokio::select! {
                biased;

                _ = stop.changed() => break,
                next = queues.next(identity_first) => next,
            };

            match next {
                Some(Next::LinkCopy(envelope)) => {
                    let _ = envelope.accepted.send(());
                    self.dispatch_link_copy(&envelope.event).await;
                    identity_first = true;
                }
                Some(Next::Identity(envelope)) => {
                    let _ = envelope.accepted.send(());
                    self.dispatch_identity(&envelope.event).await;
                    identity_first = false;
                }
                None => break,
            }
        }

        self.running.store(false, Ordering::SeqCst);
        info!("Event broker dispatch loop stopped");
        Ok(())
    }

    /// Stops the dispatch loop after the event currently being dispatched.
    ///
    /// Publishers blocked on a queued but unaccepted event get
    /// [`BrokerError::Closed`]; accepted events are never dropped.
    pub fn shutdown(&self) {
        self.stop.send_replace(true);
    }

    async fn dispatch_link_copy(&self, event: &LinkCopyEvent) {
        let listeners: Vec<Arc<dyn LinkCopyListener>> =
            self.link_copy_listeners.read().values().cloned().collect();

        for listener in listeners {
            if let Err(e) = listener.handle_link_copy(event).await {
                warn!(
                    listener = listener.id(),
                    event = "link_copy",
                    user_id = %event.user_id,
                    error = %e,
                    "Listener failed to handle event"
                );
            }
        }
    }

    async fn dispatch_identity(&self, event: &IdentityEvent) {
        let listeners: Vec<Arc<dyn IdentityListener>> =
            self.identity_listeners.read().values().cloned().collect();

        for listener in listeners {
            if let Err(e) = listener.handle_identity(event).await {
                warn!(
                    listener = listener.id(),
                    event = "identity",
                    action = %event.action,
                    user_id = %event.user_id,
                    error = %e,
                    "Listener failed to handle event"
                );
            }
        }
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerConfig::default())
    }
}

async fn hand_off<E>(tx: &mpsc::Sender<Envelope<E>>, event: E) -> Result<(), BrokerError> {
    let (accepted, ack) = oneshot::channel();

    tx.send(Envelope { event, accepted })
        .await
        .map_err(|_| BrokerError::Closed)?;

    ack.await.map_err(|_| BrokerError::Closed)
}
