//! Integration tests for the registry REST/SSE server.
//!
//! These run the server in-process on an auto-assigned port and drive it
//! with a real HTTP client, including the Server-Sent Events stream.

use mfe_registry_core::{Broadcaster, RegistryService, SqliteStore};
use mfe_registry_rpc::server::{start_server, ServerConfig};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Start a server backed by a fresh SQLite store.
///
/// Returns the service alongside the address so tests can observe
/// broadcaster state directly.
async fn start_test_server(keepalive: Duration) -> (SocketAddr, RegistryService, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqliteStore::open_at(&temp_dir.path().join("registry.db")).unwrap();
    let service = RegistryService::new(Arc::new(store), Arc::new(Broadcaster::new()));

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        keepalive,
    };
    let addr = start_server(service.clone(), config).await.unwrap();
    (addr, service, temp_dir)
}

fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

fn chat_manifest() -> Value {
    json!({
        "id": "chat",
        "displayName": "Chat",
        "version": "1.0.0",
        "remoteEntry": "https://cdn/chat.js",
        "routes": ["/chat"]
    })
}

/// Open the event stream and return the raw streaming response.
async fn open_event_stream(addr: SocketAddr) -> reqwest::Response {
    let response = reqwest::Client::new()
        .get(format!("{}/events", base_url(addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));
    response
}

/// Read the next SSE frame (terminated by a blank line) off the stream.
async fn next_frame(response: &mut reqwest::Response, buf: &mut String) -> Option<String> {
    loop {
        if let Some(pos) = buf.find("\n\n") {
            let frame = buf[..pos].to_string();
            buf.drain(..pos + 2);
            return Some(frame);
        }
        let chunk = response.chunk().await.ok()??;
        buf.push_str(&String::from_utf8_lossy(&chunk));
    }
}

async fn next_frame_within(
    response: &mut reqwest::Response,
    buf: &mut String,
    limit: Duration,
) -> String {
    tokio::time::timeout(limit, next_frame(response, buf))
        .await
        .expect("timed out waiting for SSE frame")
        .expect("event stream ended unexpectedly")
}

#[tokio::test]
async fn test_health() {
    let (addr, _service, _dir) = start_test_server(Duration::from_secs(30)).await;

    let response = reqwest::get(format!("{}/health", base_url(addr))).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_returns_stored_record_with_defaults() {
    let (addr, _service, _dir) = start_test_server(Duration::from_secs(30)).await;

    let response = reqwest::Client::new()
        .post(format!("{}/modules", base_url(addr)))
        .json(&chat_manifest())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], "chat");
    assert_eq!(body["displayName"], "Chat");
    assert_eq!(body["provides"], json!([]));
    assert_eq!(body["consumes"], json!([]));
    assert_eq!(body["nav"], Value::Null);
}

#[tokio::test]
async fn test_module_lifecycle() {
    let (addr, _service, _dir) = start_test_server(Duration::from_secs(30)).await;
    let client = reqwest::Client::new();
    let url = base_url(addr);

    let listed: Vec<Value> = reqwest::get(format!("{url}/modules"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());

    client
        .post(format!("{url}/modules"))
        .json(&chat_manifest())
        .send()
        .await
        .unwrap();

    let listed: Vec<Value> = reqwest::get(format!("{url}/modules"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], "chat");

    let response = client
        .delete(format!("{url}/modules/chat"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let listed: Vec<Value> = reqwest::get(format!("{url}/modules"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_deregister_unknown_is_404() {
    let (addr, _service, _dir) = start_test_server(Duration::from_secs(30)).await;

    let response = reqwest::Client::new()
        .delete(format!("{}/modules/ghost", base_url(addr)))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn test_invalid_manifests_rejected() {
    let (addr, _service, _dir) = start_test_server(Duration::from_secs(30)).await;
    let client = reqwest::Client::new();
    let url = base_url(addr);

    // Missing required fields
    let response = client
        .post(format!("{url}/modules"))
        .json(&json!({"id": "chat"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    // Empty id
    let mut manifest = chat_manifest();
    manifest["id"] = json!("");
    let response = client
        .post(format!("{url}/modules"))
        .json(&manifest)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    // Rejected registrations leave the registry unchanged
    let listed: Vec<Value> = reqwest::get(format!("{url}/modules"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_event_stream_observes_changes_in_order() {
    let (addr, service, _dir) = start_test_server(Duration::from_secs(30)).await;
    let client = reqwest::Client::new();
    let url = base_url(addr);

    let mut events = open_event_stream(addr).await;
    let mut buf = String::new();

    // Wait until the stream handler has actually subscribed.
    wait_for_subscribers(&service, 1).await;

    client
        .post(format!("{url}/modules"))
        .json(&chat_manifest())
        .send()
        .await
        .unwrap();
    client
        .delete(format!("{url}/modules/chat"))
        .send()
        .await
        .unwrap();

    let frame = next_frame_within(&mut events, &mut buf, Duration::from_secs(5)).await;
    let payload: Value =
        serde_json::from_str(frame.strip_prefix("data: ").unwrap()).unwrap();
    assert_eq!(payload["type"], "added");
    assert_eq!(payload["module"]["id"], "chat");
    assert_eq!(payload["module"]["provides"], json!([]));

    let frame = next_frame_within(&mut events, &mut buf, Duration::from_secs(5)).await;
    let payload: Value =
        serde_json::from_str(frame.strip_prefix("data: ").unwrap()).unwrap();
    assert_eq!(payload["type"], "removed");
    assert_eq!(payload["module"], json!({"id": "chat"}));
}

#[tokio::test]
async fn test_fanout_to_multiple_streams() {
    let (addr, service, _dir) = start_test_server(Duration::from_secs(30)).await;

    let mut stream_a = open_event_stream(addr).await;
    let mut stream_b = open_event_stream(addr).await;
    let mut buf_a = String::new();
    let mut buf_b = String::new();

    wait_for_subscribers(&service, 2).await;

    reqwest::Client::new()
        .post(format!("{}/modules", base_url(addr)))
        .json(&chat_manifest())
        .send()
        .await
        .unwrap();

    for (stream, buf) in [(&mut stream_a, &mut buf_a), (&mut stream_b, &mut buf_b)] {
        let frame = next_frame_within(stream, buf, Duration::from_secs(5)).await;
        let payload: Value =
            serde_json::from_str(frame.strip_prefix("data: ").unwrap()).unwrap();
        assert_eq!(payload["type"], "added");
        assert_eq!(payload["module"]["id"], "chat");
    }
}

#[tokio::test]
async fn test_keepalive_on_idle_stream() {
    let (addr, _service, _dir) = start_test_server(Duration::from_millis(200)).await;

    let mut events = open_event_stream(addr).await;
    let mut buf = String::new();

    let frame = next_frame_within(&mut events, &mut buf, Duration::from_secs(5)).await;
    assert_eq!(frame, ": keepalive");

    // The connection stays open and keeps emitting keepalives.
    let frame = next_frame_within(&mut events, &mut buf, Duration::from_secs(5)).await;
    assert_eq!(frame, ": keepalive");
}

#[tokio::test]
async fn test_disconnect_releases_subscription() {
    let (addr, service, _dir) = start_test_server(Duration::from_millis(100)).await;

    let events = open_event_stream(addr).await;
    wait_for_subscribers(&service, 1).await;

    drop(events);
    wait_for_subscribers(&service, 0).await;

    // Publishing after the disconnect neither blocks nor errors.
    let response = reqwest::Client::new()
        .post(format!("{}/modules", base_url(addr)))
        .json(&chat_manifest())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    assert_eq!(service.broadcaster().subscriber_count(), 0);
}

/// Poll until the broadcaster reports `expected` live subscribers.
async fn wait_for_subscribers(service: &RegistryService, expected: usize) {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        if service.broadcaster().subscriber_count() == expected {
            return;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "expected {} subscriber(s), have {}",
            expected,
            service.broadcaster().subscriber_count()
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
