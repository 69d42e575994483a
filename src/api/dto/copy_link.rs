//! DTO for the link copy endpoint.

use serde::Deserialize;
use validator::Validate;

/// A download link the visitor copied.
///
/// The front end historically sent `URL`; both spellings are accepted.
#[derive(Debug, Deserialize, Validate)]
pub struct CopyLinkRequest {
    #[serde(alias = "URL")]
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}
