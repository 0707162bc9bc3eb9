//! MFE Registry Core - Headless library for the micro-frontend module registry.
//!
//! Modules self-register by submitting a manifest; the host shell queries the
//! registry to discover installed modules and subscribes to live change
//! events. This crate provides the registry logic without any HTTP layer;
//! for the REST/SSE surface see the `mfe-registry-rpc` crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use mfe_registry_core::{Broadcaster, RegistryService, SqliteStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> mfe_registry_core::Result<()> {
//!     let store = Arc::new(SqliteStore::open_at("registry.db".as_ref())?);
//!     let broadcaster = Arc::new(Broadcaster::new());
//!     let service = RegistryService::new(store, broadcaster);
//!
//!     let modules = service.list_modules().await?;
//!     println!("{} module(s) registered", modules.len());
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod error;
pub mod schema;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use broadcast::{Broadcaster, Subscription};
pub use config::{EnvConfig, ServiceConfig, StoreConfig};
pub use error::{RegistryError, Result};
pub use schema::{ChangeEvent, ModuleRecord, ModuleRef, NavHint};
pub use service::RegistryService;
pub use store::{MemoryStore, ModuleStore, SqliteStore};
