//! Handler for the "Forget me" button.

use axum::{Extension, extract::State, http::header, response::IntoResponse};

use crate::api::middleware::identity::Identity;
use crate::domain::events::IdentityEvent;
use crate::state::AppState;
use crate::utils::cookie::clear_identity_cookie;

/// Expires the visitor's identity and clears the cookie.
///
/// # Endpoint
///
/// `POST /forget` (identity cookie required)
///
/// Publishes an identity `expired` event, which drops the visitor's recents
/// from the cache and marks the user expired in storage.
pub async fn forget_handler(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> impl IntoResponse {
    tracing::info!(user_id = %user_id, "Forgetting identity");
    state.broker.spawn_publish(IdentityEvent::expired(user_id));

    [(header::SET_COOKIE, clear_identity_cookie())]
}
