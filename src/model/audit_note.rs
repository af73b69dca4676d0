//! Audit notes written for mutations of tracked entities.

use std::fmt;

use serde::Serialize;

/// Entity types the application persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityKind {
    Person,
    RequestRecord,
    AuditNote,
}

impl EntityKind {
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Person => "Person",
            EntityKind::RequestRecord => "RequestRecord",
            EntityKind::AuditNote => "AuditNote",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
}

impl AuditAction {
    /// Stored column value.
    pub fn as_db(self) -> i64 {
        match self {
            AuditAction::Created => 0,
            AuditAction::Updated => 1,
            AuditAction::Deleted => 2,
        }
    }

    pub fn from_db(value: i64) -> Option<Self> {
        match value {
            0 => Some(AuditAction::Created),
            1 => Some(AuditAction::Updated),
            2 => Some(AuditAction::Deleted),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AuditAction::Created => "created",
            AuditAction::Updated => "changed",
            AuditAction::Deleted => "deleted",
        }
    }
}

/// An immutable record of one mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditNote {
    pub id: i64,
    pub entity_type: String,
    pub entity_repr: String,
    pub action: AuditAction,
}

impl fmt::Display for AuditNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.entity_type, self.action.label(), self.entity_repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_db_mapping() {
        for action in [AuditAction::Created, AuditAction::Updated, AuditAction::Deleted] {
            assert_eq!(AuditAction::from_db(action.as_db()), Some(action));
        }
        assert_eq!(AuditAction::from_db(3), None);
    }

    #[test]
    fn test_note_display() {
        let note = AuditNote {
            id: 1,
            entity_type: "Person".into(),
            entity_repr: "Woronow Aleks".into(),
            action: AuditAction::Updated,
        };
        assert_eq!(note.to_string(), "Person changed: Woronow Aleks");
    }
}
