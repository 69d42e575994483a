//! Event distribution: the broker and the listener contracts it dispatches to.

pub mod broker;
pub mod listener;

pub use broker::{Broker, BrokerConfig, BrokerError};
pub use listener::{IdentityListener, LinkCopyListener, ListenerError};
