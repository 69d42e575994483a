//! Handler recording that a visitor copied a download link.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use validator::Validate;

use crate::api::dto::copy_link::CopyLinkRequest;
use crate::domain::events::LinkCopyEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookie::identity_from_headers;

/// Publishes a link copy event for the visitor.
///
/// # Endpoint
///
/// `POST /link-copied`
///
/// # Request Body
///
/// ```json
/// { "url": "https://dl.k8s.io/v1.30.0/bin/linux/amd64/kubectl" }
/// ```
///
/// The identity cookie is optional; without it the event is recorded with an
/// empty user id. The event is published without waiting for the broker.
///
/// # Errors
///
/// Returns `400 Bad Request` for a malformed body or an invalid URL.
pub async fn link_copied_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CopyLinkRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(payload) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid request body",
            serde_json::json!({ "reason": rejection.body_text() }),
        )
    })?;
    payload.validate()?;

    let user_id = identity_from_headers(&headers).unwrap_or_default();
    state
        .broker
        .spawn_publish(LinkCopyEvent::new(user_id, payload.url));

    Ok(StatusCode::OK)
}
