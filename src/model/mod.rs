//! Domain types shared by the stores and the HTTP layer.

pub mod audit_note;
pub mod person;
pub mod request_record;

pub use audit_note::{AuditAction, AuditNote, EntityKind};
pub use person::{FieldErrors, ImageRef, Person, PersonDraft, PersonForm, PersonId};
pub use request_record::{NewRequest, RequestRecord, UserId};
