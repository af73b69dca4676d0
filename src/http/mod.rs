//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack)
//!     → middleware/method_override.rs (POST + override header → PUT)
//!     → middleware/auth.rs (bearer token → CurrentUser)
//!     → middleware/interceptor.rs (record or skip)
//!     → handlers/ (profile, feed, form)
//!     → pages.rs (HTML) or JSON
//!     → Send to client
//! ```

pub mod blocking;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod request;
pub mod server;

pub use blocking::run_blocking;
pub use error::AppError;
pub use request::{is_polling, X_REQUESTED_WITH, X_REQUEST_ID, XML_HTTP_REQUEST};
pub use server::{AppState, HttpServer, ServerError};
