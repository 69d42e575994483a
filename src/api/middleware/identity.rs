//! Identity cookie middleware.

use axum::{extract::Request, middleware::Next, response::Response};

use crate::error::AppError;
use crate::utils::cookie::{COOKIE_NAME, identity_from_headers};

/// Identity id taken from the request cookie.
///
/// Inserted as a request extension by [`layer`]; handlers behind it extract
/// it with `Extension<Identity>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);

/// Requires the identity cookie on every request it wraps.
///
/// # Errors
///
/// Returns `403 Forbidden` if the cookie is missing or empty.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::identity;
///
/// let protected = Router::new()
///     .route("/recent-downloads", get(recents_handler))
///     .route_layer(middleware::from_fn(identity::layer));
/// ```
pub async fn layer(mut req: Request, next: Next) -> Result<Response, AppError> {
    let Some(id) = identity_from_headers(req.headers()) else {
        tracing::info!(path = %req.uri().path(), "Request without identity cookie");
        return Err(AppError::forbidden(
            "Forbidden",
            serde_json::json!({ "reason": format!("Cookie '{}' is required", COOKIE_NAME) }),
        ));
    };

    req.extensions_mut().insert(Identity(id));
    Ok(next.run(req).await)
}
