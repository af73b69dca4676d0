//! Contact card service library.

pub mod audit;
pub mod config;
pub mod db;
pub mod http;
pub mod lifecycle;
pub mod media;
pub mod model;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
