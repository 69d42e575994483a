//! CORS for the front end's development server.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

/// Origin of the front end's dev server.
pub const DEV_ORIGIN: &str = "http://localhost:3333";

/// Allows credentialed requests from [`DEV_ORIGIN`].
///
/// Only applied when `DEV_MODE=true`; production serves the front end from the
/// same origin.
pub fn dev_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(HeaderValue::from_static(DEV_ORIGIN))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
