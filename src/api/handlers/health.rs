//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Round trip through the event store
/// 2. **Broker**: Dispatch loop is running, with registered listeners
/// 3. **Cache**: Number of users with recents
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "broker": { "status": "ok", "message": "Running, listeners: recency-cache, store-listener" },
///     "cache": { "status": "ok", "message": "Tracking 42 users" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;

    let broker_check = check_broker(&state);

    let cache_check = check_cache(&state);

    let all_healthy = db_check.is_ok() && broker_check.is_ok() && cache_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            broker: broker_check,
            cache: cache_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    if state.store.health_check().await {
        CheckStatus::ok("Connected")
    } else {
        CheckStatus::error("Database unreachable")
    }
}

/// Events published while the dispatch loop is down never reach a listener.
fn check_broker(state: &AppState) -> CheckStatus {
    if !state.broker.is_running() {
        return CheckStatus::error("Dispatch loop is not running");
    }

    let mut listeners = state.broker.link_copy_listener_ids();
    listeners.extend(state.broker.identity_listener_ids());
    listeners.sort();
    listeners.dedup();

    CheckStatus::ok(format!("Running, listeners: {}", listeners.join(", ")))
}

fn check_cache(state: &AppState) -> CheckStatus {
    CheckStatus::ok(format!("Tracking {} users", state.recents.len()))
}
