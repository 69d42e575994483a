//! API route configuration.

use crate::api::handlers::{cookie_handler, forget_handler, link_copied_handler, recents_handler};
use crate::api::middleware::identity;
use crate::state::AppState;
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Routes open to any visitor.
///
/// # Endpoints
///
/// - `GET  /cookie`       - Issue or refresh the identity cookie
/// - `POST /link-copied`  - Record a copied download link
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/cookie", get(cookie_handler))
        .route("/link-copied", post(link_copied_handler))
}

/// Routes that require the identity cookie.
///
/// # Endpoints
///
/// - `GET  /recent-downloads` - The visitor's recent distinct URLs
/// - `POST /forget`           - Expire the visitor's identity
pub fn identity_routes() -> Router<AppState> {
    Router::new()
        .route("/recent-downloads", get(recents_handler))
        .route("/forget", post(forget_handler))
        .route_layer(middleware::from_fn(identity::layer))
}
