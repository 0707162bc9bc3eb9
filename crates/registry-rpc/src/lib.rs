//! REST/SSE surface for the MFE module registry.
//!
//! Exposed as a library so integration tests can run the server in-process
//! on an auto-assigned port.

pub mod handlers;
pub mod server;
