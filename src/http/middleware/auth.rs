//! Bearer-token authentication and the login guard.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::config::AuthConfig;
use crate::http::server::AppState;
use crate::model::UserId;

/// Context attached to authenticated requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

/// Extracts the authenticated user, if any. Never rejects.
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Match an `Authorization: Bearer <key>` header against the configured users.
pub fn resolve_user(auth: &AuthConfig, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?
        .trim();

    auth.users
        .iter()
        .find(|u| !u.api_key.is_empty() && u.api_key == token)
        .map(|u| CurrentUser {
            id: u.id,
            username: u.username.clone(),
        })
}

/// Attach [`CurrentUser`] when the request carries a known token.
///
/// Unknown or missing tokens leave the request anonymous.
pub async fn authenticate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if let Some(user) = resolve_user(&state.config.auth, request.headers()) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Login page location used by [`require_login`].
#[derive(Clone, Debug)]
pub struct LoginRedirect {
    pub login_url: Arc<str>,
}

impl LoginRedirect {
    pub fn new(login_url: &str) -> Self {
        Self {
            login_url: Arc::from(login_url),
        }
    }

    pub fn location(&self, next: &str) -> String {
        let next: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
        format!("{}?next={}", self.login_url, next)
    }
}

/// Redirect anonymous callers to the login page with `302 Found`.
pub async fn require_login(
    State(redirect): State<LoginRedirect>,
    request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }

    let location = redirect.location(request.uri().path());
    tracing::debug!(path = %request.uri().path(), "Anonymous request to login-only page");
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
