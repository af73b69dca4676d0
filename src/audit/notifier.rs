//! Change notifier for tracked entity mutations.

use crate::model::{AuditAction, AuditNote, EntityKind};
use crate::observability::metrics;
use crate::store::{AuditLog, StoreResult};

/// Entity kinds whose mutations produce audit notes.
pub const TRACKED_KINDS: &[EntityKind] = &[EntityKind::Person];

/// Appends audit notes for tracked mutations.
#[derive(Clone)]
pub struct ChangeNotifier {
    log: AuditLog,
}

impl ChangeNotifier {
    pub fn new(log: AuditLog) -> Self {
        Self { log }
    }

    /// Whether mutations of `kind` are audited. Audit notes never audit themselves.
    pub fn is_tracked(kind: EntityKind) -> bool {
        kind != EntityKind::AuditNote && TRACKED_KINDS.contains(&kind)
    }

    /// Record a mutation that has already been applied.
    ///
    /// Returns `None` for untracked kinds.
    pub fn on_mutation(
        &self,
        kind: EntityKind,
        entity_id: i64,
        entity_repr: &str,
        action: AuditAction,
    ) -> StoreResult<Option<AuditNote>> {
        if !Self::is_tracked(kind) {
            return Ok(None);
        }

        let note = self.log.append(kind, entity_repr, action).map_err(|e| {
            tracing::error!(
                kind = %kind,
                entity_id,
                action = action.label(),
                error = %e,
                "Failed to append audit note"
            );
            e
        })?;

        metrics::record_audit_note(action);
        tracing::info!(kind = %kind, entity_id, action = action.label(), "Audit note appended");
        Ok(Some(note))
    }

    pub fn log(&self) -> &AuditLog {
        &self.log
    }
}
