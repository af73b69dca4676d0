//! Logged HTTP request records.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identifier of an authenticated user.
pub type UserId = i64;

/// A request about to be written to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub path: String,
    pub method: String,
    pub user: Option<UserId>,
}

impl NewRequest {
    pub fn new(path: impl Into<String>, method: impl Into<String>, user: Option<UserId>) -> Self {
        Self {
            path: path.into(),
            method: method.into(),
            user,
        }
    }
}

/// A persisted request log entry.
///
/// Only `unseen` ever changes after insert, and only from `true` to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestRecord {
    pub id: i64,
    pub path: String,
    pub method: String,
    pub user: Option<UserId>,
    /// Assigned by the store at insert time.
    pub date: DateTime<Utc>,
    pub unseen: bool,
    pub priority: u32,
}

impl std::fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.path, self.method)
    }
}
