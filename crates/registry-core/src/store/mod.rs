//! Shared registry store.
//!
//! The store is the single source of truth for installed modules: one
//! associative collection keyed by module id, values are JSON-serialized
//! manifests. The service never caches records, so multiple service
//! instances can share one store safely.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::Result;
use async_trait::async_trait;

/// Atomic hash-field operations over the module collection.
///
/// Each operation is individually atomic; there are no cross-field
/// transactions. Retry/backoff against an unreachable store is the client's
/// concern, not the registry's.
#[async_trait]
pub trait ModuleStore: Send + Sync {
    /// Upsert the manifest stored under `id`, replacing any prior value.
    async fn set(&self, id: &str, manifest: &str) -> Result<()>;

    /// Fetch all stored manifest values, in no particular order.
    async fn get_all(&self) -> Result<Vec<String>>;

    /// Delete the manifest under `id`. Returns `true` if a value was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Round-trip reachability probe.
    async fn ping(&self) -> Result<()>;
}
