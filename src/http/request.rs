//! Request header conventions.
//!
//! # Responsibilities
//! - Name the headers the service reads or sets
//! - Recognise polling (asynchronous) calls

use axum::http::HeaderMap;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Marker header sent by polling clients.
pub const X_REQUESTED_WITH: &str = "x-requested-with";

/// Value of [`X_REQUESTED_WITH`] identifying a polling call.
pub const XML_HTTP_REQUEST: &str = "XMLHttpRequest";

/// Whether the request carries the asynchronous-request marker.
pub fn is_polling(headers: &HeaderMap) -> bool {
    headers
        .get(X_REQUESTED_WITH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == XML_HTTP_REQUEST)
}
