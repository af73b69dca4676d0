//! Mutation auditing.
//!
//! # Data Flow
//! ```text
//! PersonRepository write (INSERT / UPDATE / DELETE succeeds)
//!     → ChangeNotifier::on_mutation(kind, id, repr, action)
//!     → allow-list filter (tracked kinds only, never AuditNote)
//!     → AuditLog::append (one note, synchronously)
//! ```
//!
//! # Design Decisions
//! - Explicit typed call from the write path instead of a global signal bus
//! - A failed note write fails the enclosing mutation's caller
//! - At most one note per logical mutation

pub mod notifier;

pub use notifier::{ChangeNotifier, TRACKED_KINDS};
