//! Error types for the MFE registry.
//!
//! This module defines the error taxonomy for registry operations and the
//! mapping to HTTP status codes used by the RPC layer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    // Validation errors, rejected before any store mutation
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Module not found: {id}")]
    ModuleNotFound { id: String },

    // Store errors
    #[error("Store unavailable: {message}")]
    StoreUnavailable {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Startup configuration errors, logged and never fatal
    #[error("Pinned modules load failed: {message}")]
    PinnedLoad { message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

// Conversion implementations for common error types

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(err: rusqlite::Error) -> Self {
        RegistryError::StoreUnavailable {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl RegistryError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        RegistryError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Convert to an HTTP status code.
    ///
    /// - Validation errors reject the payload: 422
    /// - Unknown module id: 404
    /// - Store unreachable: 503
    /// - Everything else is an internal error: 500
    pub fn http_status(&self) -> u16 {
        match self {
            RegistryError::Validation { .. } => 422,
            RegistryError::ModuleNotFound { .. } => 404,
            RegistryError::StoreUnavailable { .. } => 503,
            _ => 500,
        }
    }
}
