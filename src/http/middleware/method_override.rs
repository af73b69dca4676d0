//! Method override for clients that can only send POST.
//!
//! Runs before routing so the rewritten method selects the handler and the
//! interceptor's exemption lookup.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::error::AppError;

pub const X_HTTP_METHOD_OVERRIDE: &str = "x-http-method-override";

/// Form-encoded body of an overridden PUT request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutForm(pub Vec<(String, String)>);

impl PutForm {
    pub fn parse(body: &[u8]) -> Self {
        Self(url::form_urlencoded::parse(body).into_owned().collect())
    }

    /// First value submitted for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Whether the request asks to be treated as a PUT.
pub fn wants_put(request: &Request) -> bool {
    request
        .headers()
        .get(X_HTTP_METHOD_OVERRIDE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("put"))
}

/// Rewrite the method to PUT and attach the parsed body as [`PutForm`].
///
/// The body bytes are passed on unchanged.
pub async fn method_override(
    State(max_body): State<usize>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !wants_put(&request) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, max_body)
        .await
        .map_err(|e| AppError::BadRequest(format!("unreadable request body: {}", e)))?;

    tracing::debug!(
        from = %parts.method,
        path = %parts.uri.path(),
        "Applying method override"
    );
    parts.method = Method::PUT;
    parts.extensions.insert(PutForm::parse(&bytes));

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}
