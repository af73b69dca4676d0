//! Schema upgrades for the contact-card database.
//!
//! # Data Flow
//! ```text
//! open.rs
//!     → migrate(conn)
//!     → read PRAGMA user_version
//!     → run every SCHEMA_STEPS entry above it, in order, inside one transaction
//!     → bump user_version after each step
//! ```
//!
//! # Design Decisions
//! - Steps are embedded SQL files, numbered from 1 with no gaps
//! - A database stamped newer than this binary is refused, never downgraded
//! - One transaction covers the whole upgrade, so a failed step leaves the
//!   previous schema untouched

use rusqlite::Connection;

use crate::db::{DbError, DbResult};

/// One numbered schema change.
#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

/// Request log, person profile and audit notes.
const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Schema version this binary upgrades databases to.
pub fn target_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Bring `conn` up to [`target_version`].
pub fn migrate(conn: &mut Connection) -> DbResult<()> {
    let from = stored_version(conn)?;
    let to = target_version();

    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }
    if from == to {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > from) {
        tx.execute_batch(step.sql)?;
        // PRAGMA takes no bound parameters.
        tx.execute_batch(&format!("PRAGMA user_version = {};", step.version))?;
        tracing::debug!(version = step.version, "Applied schema step");
    }
    tx.commit()?;

    tracing::info!(from, to, "Database schema upgraded");
    Ok(())
}

/// The version stamped on the database file.
pub(crate) fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
