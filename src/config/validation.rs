//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, feed size > 0)
//! - Detect conflicting users (duplicate ids or tokens)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check the configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.trim().is_empty() {
        errors.push(ValidationError::new("listener.bind_address", "must not be empty"));
    }

    if config.database.path.trim().is_empty() {
        errors.push(ValidationError::new("database.path", "must not be empty"));
    }

    if config.media.root.trim().is_empty() {
        errors.push(ValidationError::new("media.root", "must not be empty"));
    }

    if config.feed.limit == 0 {
        errors.push(ValidationError::new("feed.limit", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let mut ids = HashSet::new();
    let mut keys = HashSet::new();
    for (i, user) in config.auth.users.iter().enumerate() {
        if !ids.insert(user.id) {
            errors.push(ValidationError::new(
                format!("auth.users[{}].id", i),
                format!("duplicate user id {}", user.id),
            ));
        }
        if user.api_key.is_empty() {
            errors.push(ValidationError::new(
                format!("auth.users[{}].api_key", i),
                "must not be empty",
            ));
        } else if !keys.insert(user.api_key.as_str()) {
            errors.push(ValidationError::new(
                format!("auth.users[{}].api_key", i),
                "duplicate api key",
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
