//! Handler for a visitor's recently copied links.

use axum::{Extension, Json, extract::State};

use crate::api::middleware::identity::Identity;
use crate::state::AppState;

/// Returns the visitor's most recent distinct copied URLs, oldest first.
///
/// # Endpoint
///
/// `GET /recent-downloads` (identity cookie required)
///
/// # Response
///
/// ```json
/// ["https://dl.k8s.io/v1.29.0/bin/linux/amd64/kubectl", "https://dl.k8s.io/v1.30.0/bin/linux/amd64/kubectl"]
/// ```
///
/// An unknown id yields an empty array.
pub async fn recents_handler(
    State(state): State<AppState>,
    Extension(Identity(user_id)): Extension<Identity>,
) -> Json<Vec<String>> {
    let urls = state.recents.recents(&user_id);
    tracing::debug!(user_id = %user_id, count = urls.len(), "Serving recent downloads");
    Json(urls)
}
