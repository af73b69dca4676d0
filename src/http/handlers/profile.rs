//! Profile page.

use axum::extract::State;
use axum::response::Html;

use crate::http::blocking::run_blocking;
use crate::http::error::AppError;
use crate::http::middleware::MaybeUser;
use crate::http::pages;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::StoreResult;

/// `GET /`.
///
/// A signed-in visitor has seen every logged request, so the unseen flag is
/// cleared in one statement before the page renders.
pub async fn home_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> Result<Html<String>, AppError> {
    let signed_in = user.is_some();
    let requests = state.requests.clone();
    let people = state.people.clone();

    let (cleared, person) = run_blocking(move || -> StoreResult<_> {
        let cleared = if signed_in {
            Some(requests.clear_unseen()?)
        } else {
            None
        };
        Ok((cleared, people.first()?))
    })
    .await?;

    if let (Some(user), Some(cleared)) = (&user, cleared) {
        metrics::record_unseen_cleared(cleared);
        tracing::debug!(user_id = user.id, cleared, "Marked requests as seen");
    }

    let page = match person {
        Some(person) => pages::profile_page(&person, signed_in),
        None => pages::empty_profile_page(signed_in),
    };
    Ok(Html(page))
}
