//! Services for the application layer.

pub mod identity_service;
pub mod store_listener;

pub use identity_service::IdentityService;
pub use store_listener::StoreListener;
