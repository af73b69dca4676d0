//! SQLite storage bootstrap.
//!
//! # Data Flow
//! ```text
//! DatabaseConfig
//!     → open.rs (connect, pragmas, busy timeout)
//!     → migrations/ (apply pending schema versions)
//!     → Database (shared handle, one connection behind a mutex)
//!     → store/ repositories borrow the connection per statement
//! ```
//!
//! # Design Decisions
//! - Every write issued by the stores is a single statement, so callers never
//!   hold the lock across more than one logical write
//! - `with_conn` blocks on the mutex and on SQLite itself; async callers go
//!   through `http::run_blocking` so tokio workers never wait on disk
//! - Migration version is tracked via `PRAGMA user_version`
//! - Nothing reads or writes application data before migrations succeed

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Errors raised by the storage layer itself.
#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },

    /// A thread panicked while holding the connection.
    #[error("database connection lock poisoned")]
    Poisoned,
}

/// Cloneable handle to the application database.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Wrap an already bootstrapped connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open (or create) the database file at `path`.
    ///
    /// `:memory:` opens a private in-memory database.
    pub fn open(path: &str, busy_timeout_ms: u64) -> DbResult<Self> {
        let conn = if path == ":memory:" {
            open_db_in_memory()?
        } else {
            open_db(path, busy_timeout_ms)?
        };
        Ok(Self::from_connection(conn))
    }

    /// Open a fresh in-memory database with the schema applied.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Run `f` with exclusive access to the connection.
    pub fn with_conn<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let conn = self.conn.lock().map_err(|_| DbError::Poisoned)?;
        f(&conn)
    }
}
