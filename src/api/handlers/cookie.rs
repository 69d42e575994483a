//! Handler issuing and refreshing the identity cookie.

use axum::{
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use chrono::Utc;

use crate::domain::events::IdentityEvent;
use crate::state::AppState;
use crate::utils::cookie::{identity_cookie, identity_from_headers};

/// Issues an identity cookie, or extends the one the visitor already has.
///
/// # Endpoint
///
/// `GET /cookie`
///
/// # Behavior
///
/// - **No cookie**: mints a new id, publishes an identity `created` event
///   without waiting for the broker, and sets the cookie.
/// - **Cookie present**: re-issues the same id with a fresh expiry. No event
///   is published.
///
/// Always responds `200 OK` with an empty body.
pub async fn cookie_handler(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let cookie = match identity_from_headers(&headers) {
        Some(id) => {
            let expires_at = Utc::now() + state.identity_service.ttl();
            tracing::debug!(user_id = %id, "Refreshing identity cookie");
            identity_cookie(&id, expires_at)
        }
        None => {
            let user = state.identity_service.mint();
            tracing::info!(user_id = %user.id, "Issued new identity");
            state
                .broker
                .spawn_publish(IdentityEvent::created(user.id.clone(), user.expires_at));
            identity_cookie(&user.id, user.expires_at)
        }
    };

    [(header::SET_COOKIE, cookie)]
}
