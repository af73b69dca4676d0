//! Contact card service.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client ──▶ http::server (layers) ──▶ routing::RouteTable ──▶ http::handlers
//!                   │                          │                       │
//!                   │ method override          │ ExemptionRegistry     │
//!                   │ auth                     ▼                       ▼
//!                   └──────────────▶ interceptor ──▶ store::RequestStore
//!                                                                      │
//!                             store::PersonRepository ──▶ audit::ChangeNotifier
//!                                                                      │
//!                                                      db (SQLite, migrations)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use contact_card::config::{load_config, AppConfig};
use contact_card::observability::{logging, metrics};
use contact_card::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "contact-card")]
#[command(about = "Personal contact card with request logging", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "contact-card starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        database = %config.database.path,
        media_root = %config.media.root,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config)?;
    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
