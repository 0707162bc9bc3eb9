//! HTTP server implementation using Axum.

use crate::handlers::{deregister_module, health, list_modules, register_module, stream_events};
use axum::http::HeaderValue;
use axum::{
    routing::{delete, get},
    Router,
};
use mfe_registry_core::{RegistryService, ServiceConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Application state shared across handlers.
pub struct AppState {
    /// Registry operations (store access + event fan-out)
    pub service: RegistryService,
    /// Idle interval before an event stream emits a keepalive frame
    pub keepalive: Duration,
}

/// Server configuration resolved from CLI flags and environment.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; `*` anywhere in the list allows any origin.
    pub cors_origins: Vec<String>,
    pub keepalive: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: ServiceConfig::DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            keepalive: ServiceConfig::KEEPALIVE_INTERVAL,
        }
    }
}

/// Start the registry HTTP server.
///
/// Returns the actual address the server is bound to (useful when port=0).
pub async fn start_server(
    service: RegistryService,
    config: ServerConfig,
) -> anyhow::Result<SocketAddr> {
    let state = Arc::new(AppState {
        service,
        keepalive: config.keepalive,
    });

    let cors = cors_layer(&config.cors_origins);

    let app = Router::new()
        .route("/modules", get(list_modules).post(register_module))
        .route("/modules/:id", delete(deregister_module))
        .route("/events", get(stream_events))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Server listening on {}", actual_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(actual_addr)
}

/// Build the CORS layer from the configured origin list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
