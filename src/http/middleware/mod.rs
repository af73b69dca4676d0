//! Request middleware, outermost first.
//!
//! # Data Flow
//! ```text
//! method_override.rs  (X-HTTP-Method-Override: PUT → PUT + parsed form body)
//!     → routing (MatchedPath + method dispatch)
//!     → auth.rs        (bearer token → CurrentUser extension)
//!     → interceptor.rs (record-or-skip, write before the handler runs)
//!     → auth.rs login guard (login-only endpoints)
//!     → handler
//! ```

pub mod auth;
pub mod interceptor;
pub mod method_override;

pub use auth::{authenticate, require_login, CurrentUser, LoginRedirect, MaybeUser};
pub use interceptor::{decide, intercept, Decision, SkipReason};
pub use method_override::{method_override, PutForm, X_HTTP_METHOD_OVERRIDE};
