//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /cookie`           - Identity cookie (public)
//! - `POST /link-copied`      - Link copy events (public)
//! - `GET  /recent-downloads` - Recents (identity cookie required)
//! - `POST /forget`           - Expire identity (identity cookie required)
//! - `GET  /health`           - Health check: DB, broker, cache (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on the cookie and event routes
//! - **CORS** - Credentialed requests from the dev front end, dev mode only
//!
//! Trailing slash normalization wraps the whole router in [`crate::server`].

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::{cors, rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;

/// Switches for the optional layers.
#[derive(Debug, Clone, Copy)]
pub struct RouterOptions {
    /// Adds the dev front end CORS layer.
    pub dev_mode: bool,
    /// Adds per-IP rate limiting; requires connect info on the server.
    pub rate_limit: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            dev_mode: false,
            rate_limit: true,
        }
    }
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState, options: RouterOptions) -> Router {
    let mut public = api::routes::public_routes();
    if options.rate_limit {
        public = public.layer(rate_limit::layer());
    }

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .merge(public)
        .merge(api::routes::identity_routes())
        .with_state(state)
        .layer(tracing::layer());

    if options.dev_mode {
        router = router.layer(cors::dev_layer());
    }

    router
}
