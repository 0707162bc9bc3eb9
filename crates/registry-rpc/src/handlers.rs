//! REST and SSE request handlers.

use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    response::IntoResponse,
    Json,
};
use futures::Stream;
use mfe_registry_core::{ModuleRecord, RegistryError};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error};

/// Client-facing error responder.
///
/// Maps the registry error taxonomy onto HTTP statuses with a
/// `{"error": "..."}` body.
pub struct ApiError(RegistryError);

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

/// `GET /modules`: all currently-registered modules as a JSON array.
pub async fn list_modules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ModuleRecord>>, ApiError> {
    let modules = state.service.list_modules().await?;
    Ok(Json(modules))
}

/// `POST /modules`: store a manifest, broadcast `added`, return the stored
/// record with defaults filled.
pub async fn register_module(
    State(state): State<Arc<AppState>>,
    Json(record): Json<ModuleRecord>,
) -> Result<(StatusCode, Json<ModuleRecord>), ApiError> {
    let stored = state.service.register_module(record).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `DELETE /modules/{id}`: remove a module, broadcast `removed`.
pub async fn deregister_module(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.deregister_module(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /health`: 200 once the store answers a round-trip ping.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    state.service.health().await?;
    Ok(Json(json!({"status": "ok"})))
}

/// `GET /events`: persistent Server-Sent Events stream of registry changes.
///
/// Each change arrives as one `data:` frame in publish order. When no event
/// arrives within the keepalive interval a comment frame is sent instead,
/// which keeps intermediaries from closing the idle connection and lets a
/// dead peer surface promptly. The subscription is released when the stream
/// is dropped, whichever way the connection ends.
pub async fn stream_events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut subscription = state.service.broadcaster().subscribe();
    let keepalive = state.keepalive;

    let stream = async_stream::stream! {
        loop {
            match tokio::time::timeout(keepalive, subscription.recv()).await {
                Ok(Some(payload)) => yield Ok(Event::default().data(payload)),
                // Channel closed; no more events will ever arrive.
                Ok(None) => break,
                Err(_elapsed) => {
                    debug!("Event stream idle, sending keepalive");
                    yield Ok(Event::default().comment("keepalive"));
                }
            }
        }
    };

    Sse::new(stream)
}
