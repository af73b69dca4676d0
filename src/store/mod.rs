//! Persistence repositories over the shared SQLite handle.
//!
//! # Data Flow
//! ```text
//! Interceptor      → request_store.rs (INSERT one row per logged request)
//! Profile view     → request_store.rs (bulk UPDATE of the unseen flag)
//! Feed endpoint    → request_store.rs (COUNT unseen, newest N rows)
//! Form handler     → person_repo.rs   (create/update/delete)
//!                        → audit::ChangeNotifier → audit_log.rs (INSERT note)
//! ```
//!
//! # Design Decisions
//! - One statement per write; the unseen clear is a single conditional UPDATE
//! - Write paths validate before touching SQL
//! - Read paths reject invalid persisted state instead of masking it

use thiserror::Error;

use crate::db::DbError;
use crate::model::{EntityKind, FieldErrors};

pub mod audit_log;
pub mod person_repo;
pub mod request_store;

pub use audit_log::AuditLog;
pub use person_repo::PersonRepository;
pub use request_store::RequestStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository-level error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),

    #[error("validation failed: {0}")]
    Validation(#[from] FieldErrors),

    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
