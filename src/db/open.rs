//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use std::path::Path;
use std::time::{Duration, Instant};

use rusqlite::Connection;

use super::migrations::migrate;
use super::DbResult;

/// Opens a SQLite database file and applies all pending migrations.
pub fn open_db(path: impl AsRef<Path>, busy_timeout_ms: u64) -> DbResult<Connection> {
    let started_at = Instant::now();
    let path = path.as_ref();

    let mut conn = Connection::open(path).map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "Failed to open database");
        err
    })?;

    bootstrap_connection(&mut conn, Duration::from_millis(busy_timeout_ms))?;
    tracing::info!(
        path = %path.display(),
        duration_ms = started_at.elapsed().as_millis() as u64,
        "Database opened"
    );
    Ok(conn)
}

/// Opens an in-memory SQLite database and applies all pending migrations.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let mut conn = Connection::open_in_memory()?;
    bootstrap_connection(&mut conn, Duration::from_secs(5))?;
    tracing::debug!("In-memory database opened");
    Ok(conn)
}

fn bootstrap_connection(conn: &mut Connection, busy_timeout: Duration) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(busy_timeout)?;
    migrate(conn)?;
    Ok(())
}
