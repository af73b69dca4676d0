//! Offload synchronous work from the async handlers.
//!
//! SQLite calls and photo decoding block the calling thread. Handlers and the
//! interceptor hand that work to tokio's blocking pool through [`run_blocking`]
//! so a slow disk or a large upload never stalls the runtime's workers.

use tokio::task;

use crate::http::error::AppError;

/// Run `work` on the blocking pool and convert its error for the HTTP edge.
///
/// A panic inside `work` surfaces as [`AppError::Task`].
pub async fn run_blocking<T, E, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    task::spawn_blocking(work).await?.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use crate::db::{Database, DbError};
    use crate::store::{RequestStore, StoreError};

    #[tokio::test(flavor = "current_thread")]
    async fn test_store_calls_run_off_the_runtime_thread() {
        let requests = RequestStore::new(Database::open_in_memory().unwrap());
        let caller = std::thread::current().id();

        let (worker, unseen) = run_blocking(move || -> Result<_, StoreError> {
            Ok((std::thread::current().id(), requests.unseen_count()?))
        })
        .await
        .unwrap();

        assert_ne!(worker, caller);
        assert_eq!(unseen, 0);
    }

    #[tokio::test]
    async fn test_store_error_keeps_its_mapping() {
        let err = run_blocking(|| -> Result<(), StoreError> { Err(DbError::Poisoned.into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(StoreError::Db(DbError::Poisoned))));
    }

    #[tokio::test]
    async fn test_panicking_work_is_internal_error() {
        let err = run_blocking(|| -> Result<(), AppError> { panic!("worker died") })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Task(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
