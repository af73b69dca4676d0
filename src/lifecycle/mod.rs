//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! main / tests
//!     → Shutdown::new()
//!     → HttpServer::run(listener, shutdown.subscribe())
//!     → Ctrl+C or Shutdown::trigger() → stop accepting → drain → return
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
