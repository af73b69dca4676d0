//! Append-only storage for audit notes.

use rusqlite::{params, Row};

use crate::db::Database;
use crate::model::{AuditAction, AuditNote, EntityKind};
use crate::store::{StoreError, StoreResult};

/// Audit note repository. Notes are never updated or deleted.
#[derive(Clone)]
pub struct AuditLog {
    db: Database,
}

impl AuditLog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Append one note.
    pub fn append(
        &self,
        kind: EntityKind,
        entity_repr: &str,
        action: AuditAction,
    ) -> StoreResult<AuditNote> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO audit_note (entity_type, entity_repr, action) VALUES (?1, ?2, ?3);",
                params![kind.name(), entity_repr, action.as_db()],
            )?;

            Ok(AuditNote {
                id: conn.last_insert_rowid(),
                entity_type: kind.name().to_string(),
                entity_repr: entity_repr.to_string(),
                action,
            })
        })
    }

    /// All notes in insertion order.
    pub fn list(&self) -> StoreResult<Vec<AuditNote>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, entity_type, entity_repr, action FROM audit_note ORDER BY id ASC;",
            )?;
            let mut rows = stmt.query([])?;
            let mut notes = Vec::new();
            while let Some(row) = rows.next()? {
                notes.push(parse_row(row)?);
            }
            Ok(notes)
        })
    }

    pub fn count(&self) -> StoreResult<u64> {
        self.db.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM audit_note;", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}

fn parse_row(row: &Row<'_>) -> StoreResult<AuditNote> {
    let raw_action: i64 = row.get("action")?;
    let action = AuditAction::from_db(raw_action).ok_or_else(|| {
        StoreError::InvalidData(format!("invalid action `{raw_action}` in audit_note.action"))
    })?;

    Ok(AuditNote {
        id: row.get("id")?,
        entity_type: row.get("entity_type")?,
        entity_repr: row.get("entity_repr")?,
        action,
    })
}
