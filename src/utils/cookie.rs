//! Identity cookie parsing and formatting.

use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};

/// Name of the identity cookie, shared with the front end.
pub const COOKIE_NAME: &str = "downloadkubernetes";

/// Extracts the identity id from the request's `Cookie` headers.
///
/// Handles multiple cookies per header and multiple `Cookie` headers.
/// An empty value counts as no identity.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert(header::COOKIE, "theme=dark; downloadkubernetes=ABC123".parse().unwrap());
///
/// assert_eq!(identity_from_headers(&headers), Some("ABC123".to_string()));
/// ```
pub fn identity_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let mut parts = cookie.trim().splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(COOKIE_NAME), Some(value)) if !value.is_empty() => Some(value.to_string()),
                _ => None,
            }
        })
}

/// Builds the `Set-Cookie` value issuing `id` until `expires_at`.
pub fn identity_cookie(id: &str, expires_at: DateTime<Utc>) -> String {
    format!(
        "{}={}; Path=/; Expires={}; SameSite=Strict",
        COOKIE_NAME,
        id,
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Builds the `Set-Cookie` value that removes the identity cookie.
pub fn clear_identity_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; SameSite=Strict", COOKIE_NAME)
}
