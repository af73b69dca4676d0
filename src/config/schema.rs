//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the contact card service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// SQLite database settings.
    pub database: DatabaseConfig,

    /// Uploaded media storage.
    pub media: MediaConfig,

    /// Known users and login redirect.
    pub auth: AuthConfig,

    /// Request feed settings.
    pub feed: FeedConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite file. `:memory:` opens a private in-memory database.
    pub path: String,

    /// How long a statement waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "contact.db".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Media (uploaded photo) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory uploaded files are written under.
    pub root: String,

    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: "media".to_string(),
            max_upload_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// A user allowed to authenticate with a bearer token.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct UserConfig {
    pub id: i64,
    pub username: String,
    /// Bearer token presented in the `Authorization` header.
    pub api_key: String,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub users: Vec<UserConfig>,

    /// Where anonymous callers of login-only pages are sent.
    pub login_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            users: vec![UserConfig {
                id: 1,
                username: "admin".to_string(),
                // WARNING: This is a placeholder! Change this in production.
                api_key: "CHANGE_ME_IN_PRODUCTION".to_string(),
            }],
            login_url: "/login".to_string(),
        }
    }
}

/// Request feed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Number of most recent requests returned to polling clients.
    pub limit: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
