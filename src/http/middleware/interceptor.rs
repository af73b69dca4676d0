//! Request logging interceptor.
//!
//! # Responsibilities
//! - Decide record-or-skip from the resolved handler's tag
//! - Write one request record before the handler runs
//! - Fail the request when the write fails
//!
//! # Design Decisions
//! - Installed with `route_layer`, so unmatched paths never reach it
//! - A matched path with no tag for the method (405) is treated as unresolved
//! - No retries: the storage error becomes a 500
//! - The insert runs on the blocking pool; the handler starts only after it returns

use axum::extract::{MatchedPath, Request, State};
use axum::http::Method;
use axum::middleware::Next;
use axum::response::Response;

use crate::http::blocking::run_blocking;
use crate::http::error::AppError;
use crate::http::middleware::auth::CurrentUser;
use crate::http::server::AppState;
use crate::model::NewRequest;
use crate::observability::metrics;
use crate::routing::ExemptionRegistry;

/// Why a request was not recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The handler carries the exemption mark.
    Exempt,
    /// Route resolution did not produce a registered handler.
    Unresolved,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::Exempt => "exempt",
            SkipReason::Unresolved => "unresolved",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Record { handler: &'static str },
    Skip(SkipReason),
}

/// The interceptor's decision rule.
pub fn decide(registry: &ExemptionRegistry, matched: Option<&str>, method: &Method) -> Decision {
    let Some(path) = matched else {
        return Decision::Skip(SkipReason::Unresolved);
    };

    match registry.lookup(path, method) {
        None => Decision::Skip(SkipReason::Unresolved),
        Some(tag) if tag.exempt => Decision::Skip(SkipReason::Exempt),
        Some(tag) => Decision::Record { handler: tag.name },
    }
}

pub async fn intercept(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let matched = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned());

    match decide(&state.registry, matched.as_deref(), request.method()) {
        Decision::Skip(reason) => {
            metrics::record_request_skipped(reason.as_str());
        }
        Decision::Record { handler } => {
            let user = request.extensions().get::<CurrentUser>().map(|u| u.id);
            let new = NewRequest::new(request.uri().path(), request.method().as_str(), user);

            let requests = state.requests.clone();
            let record = run_blocking(move || {
                requests.record(&new).map_err(|e| {
                    tracing::error!(
                        path = %new.path,
                        method = %new.method,
                        error = %e,
                        "Failed to record request"
                    );
                    AppError::Storage(e)
                })
            })
            .await?;

            metrics::record_request_logged(&record.method);
            tracing::debug!(
                id = record.id,
                path = %record.path,
                method = %record.method,
                user_id = ?record.user,
                handler,
                "Request recorded"
            );
        }
    }

    Ok(next.run(request).await)
}
