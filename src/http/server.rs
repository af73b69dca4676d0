//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Open storage and build the shared application state
//! - Register endpoints and freeze the exemption registry
//! - Wire up middleware (tracing, limits, request ID, override, auth, interceptor)
//! - Bind server to listener and shut down gracefully
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → PropagateRequestId → TraceLayer → Timeout → BodyLimit
//!     → method_override                 (before routing)
//!     → authenticate                    (inner router, every route)
//!     → intercept                       (route_layer, matched routes only)
//!     → require_login                   (login-only endpoints)
//!     → handler
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::middleware::from_fn_with_state;
use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::audit::ChangeNotifier;
use crate::config::AppConfig;
use crate::db::{Database, DbError};
use crate::http::handlers::{feed, form, profile};
use crate::http::middleware::{authenticate, intercept, method_override, require_login, LoginRedirect};
use crate::http::request::X_REQUEST_ID;
use crate::media::MediaStore;
use crate::routing::{login_required, mark_exempt, Endpoint, ExemptionRegistry, RouteError, RouteTable};
use crate::store::{AuditLog, PersonRepository, RequestStore};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub requests: RequestStore,
    pub people: PersonRepository,
    pub audit: AuditLog,
    pub registry: Arc<ExemptionRegistry>,
    pub media: MediaStore,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to open database: {0}")]
    Database(#[from] DbError),

    #[error("invalid route table: {0}")]
    Routes(#[from] RouteError),
}

/// Every endpoint the service exposes, with its capability flags.
pub fn endpoints() -> Vec<Endpoint<AppState>> {
    vec![
        Endpoint::new("/", "home_page").get(profile::home_page),
        mark_exempt(Endpoint::new("/request", "request_page").get(feed::request_page)),
        mark_exempt(Endpoint::new("/request/ajax", "request_feed").get(feed::request_feed)),
        login_required(mark_exempt(
            Endpoint::new("/form", "form")
                .get(form::form_page)
                .post(form::submit_form)
                .put(form::put_form),
        )),
    ]
}

/// HTTP server for the contact card.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Open the configured database and assemble the server.
    pub fn new(config: AppConfig) -> Result<Self, ServerError> {
        let db = Database::open(&config.database.path, config.database.busy_timeout_ms)?;
        Self::with_database(config, db)
    }

    /// Assemble the server over an already opened database.
    pub fn with_database(config: AppConfig, db: Database) -> Result<Self, ServerError> {
        let config = Arc::new(config);
        let audit = AuditLog::new(db.clone());
        let media = MediaStore::new(&config.media.root);
        let people = PersonRepository::new(
            db.clone(),
            ChangeNotifier::new(audit.clone()),
            media.clone(),
        );

        let redirect = LoginRedirect::new(&config.auth.login_url);
        let table = RouteTable::build(endpoints(), |method_router| {
            method_router.route_layer(from_fn_with_state(redirect.clone(), require_login))
        })?;

        let state = AppState {
            config: config.clone(),
            requests: RequestStore::new(db),
            people,
            audit,
            registry: Arc::new(table.registry),
            media,
        };

        tracing::info!(
            endpoints = state.registry.len(),
            database = %config.database.path,
            media_root = %config.media.root,
            "Server assembled"
        );

        let router = Self::build_router(&config, state.clone(), table.router);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState, routes: Router<AppState>) -> Router {
        let max_body = config.media.max_upload_bytes;
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        let app = routes
            .route_layer(from_fn_with_state(state.clone(), intercept))
            .layer(from_fn_with_state(state.clone(), authenticate))
            .nest_service("/media", ServeDir::new(&config.media.root))
            .layer(DefaultBodyLimit::max(max_body))
            .with_state(state);

        // The override has to rewrite the method before the inner router
        // picks a handler, so it wraps the whole router as a service.
        Router::new()
            .fallback_service(app)
            .layer(from_fn_with_state(max_body, method_override))
            .layer(RequestBodyLimitLayer::new(max_body))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Stops on Ctrl+C or when `shutdown` fires, letting in-flight requests finish.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for Ctrl+C or an explicit shutdown broadcast.
async fn shutdown_signal(mut shutdown: broadcast::Receiver<()>) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => match result {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                // Keep serving until an explicit shutdown arrives.
                let _ = shutdown.recv().await;
            }
        },
        _ = shutdown.recv() => tracing::info!("Shutdown requested"),
    }
}
