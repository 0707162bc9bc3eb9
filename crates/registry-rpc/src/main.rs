//! MFE Registry Server - REST/SSE backend for the micro-frontend shell.
//!
//! Modules POST their manifest here on startup. The shell queries this
//! service to discover installed modules; changes are pushed to the shell
//! via Server-Sent Events.

use anyhow::Result;
use clap::Parser;
use mfe_registry_core::{Broadcaster, EnvConfig, RegistryService, ServiceConfig, SqliteStore};
use mfe_registry_rpc::server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "mfe-registry")]
#[command(about = "Module registry for the micro-frontend shell")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value_t = ServiceConfig::DEFAULT_PORT)]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting {}", ServiceConfig::APP_NAME);

    // Resolve environment configuration
    let db_path = std::env::var(EnvConfig::REGISTRY_DB)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(ServiceConfig::DEFAULT_DB_FILE));
    let cors_origins: Vec<String> = std::env::var(EnvConfig::CORS_ORIGINS)
        .unwrap_or_else(|_| "*".to_string())
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect();
    let modules_json = std::env::var(EnvConfig::MODULES_JSON)
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from);

    info!("Module store: {}", db_path.display());

    // Wire up the registry
    let store = Arc::new(SqliteStore::open_at(&db_path)?);
    let broadcaster = Arc::new(Broadcaster::new());
    let service = RegistryService::new(store, broadcaster);

    // Seed pinned defaults; live self-registration overwrites them later
    if let Some(path) = modules_json {
        service.load_pinned_defaults(&path).await;
    }

    let config = server::ServerConfig {
        host: args.host,
        port: args.port,
        cors_origins,
        keepalive: ServiceConfig::KEEPALIVE_INTERVAL,
    };
    let addr = server::start_server(service, config).await?;

    info!("Registry running on {}", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    Ok(())
}
