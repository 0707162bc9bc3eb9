//! Centralized configuration constants for the MFE registry.

use std::time::Duration;

/// Service-level configuration.
pub struct ServiceConfig;

impl ServiceConfig {
    pub const APP_NAME: &'static str = "MFE Registry";
    /// Idle interval after which an event stream emits a keepalive frame.
    pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);
    pub const DEFAULT_PORT: u16 = 8090;
    pub const DEFAULT_DB_FILE: &'static str = "registry.db";
}

/// Store-level configuration.
pub struct StoreConfig;

impl StoreConfig {
    /// How long SQLite waits on a locked database before failing.
    pub const BUSY_TIMEOUT_MS: u32 = 5_000;
}

/// Environment variable names recognized at startup.
pub struct EnvConfig;

impl EnvConfig {
    /// Store location (SQLite database path).
    pub const REGISTRY_DB: &'static str = "REGISTRY_DB";
    /// Comma-separated allowed CORS origins; `*` allows any.
    pub const CORS_ORIGINS: &'static str = "CORS_ORIGINS";
    /// Optional path to a pinned-modules definition file.
    pub const MODULES_JSON: &'static str = "MODULES_JSON";
}
