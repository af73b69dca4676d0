//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     Endpoint[] (path, handler name, methods, exempt / login flags)
//!     → RouteTable::build
//!     → ExemptionRegistry (frozen (path, method) → HandlerTag map)
//!     → axum Router (login guard applied per endpoint)
//!
//! Incoming request:
//!     axum resolves MatchedPath + method
//!     → interceptor looks up HandlerTag in the registry
//! ```
//!
//! # Design Decisions
//! - Exemption is a flag carried with the registration, not a runtime wrapper
//! - Registry is immutable after construction (thread-safe without locks)
//! - Marking order does not matter: flags compose in either order

pub mod registry;

pub use registry::{
    login_required, mark_exempt, Endpoint, ExemptionRegistry, HandlerTag, RouteError, RouteTable,
};
