//! HTTP request handlers.
//!
//! Each handler module corresponds to one endpoint.

pub mod cookie;
pub mod forget;
pub mod health;
pub mod link_copied;
pub mod recents;

pub use cookie::cookie_handler;
pub use forget::forget_handler;
pub use health::health_handler;
pub use link_copied::link_copied_handler;
pub use recents::recents_handler;
