//! Change-event fan-out to subscribed observers.
//!
//! One `Broadcaster` is instantiated per process and injected into the
//! registry service and every event stream handler. Each subscriber owns an
//! unbounded FIFO channel of pre-serialized events; `publish` pushes into
//! every live channel without blocking.
//!
//! # Thread Safety
//!
//! The live-subscriber set is behind a `std::sync::Mutex` with short critical
//! sections that never span an await point. `publish` serializes the event
//! once and fans the string out under the lock.

use crate::error::Result;
use crate::schema::ChangeEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

/// Fans out change events to all live subscriber channels.
#[derive(Default)]
pub struct Broadcaster {
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<String>>>,
    next_id: AtomicU64,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber channel.
    ///
    /// The returned `Subscription` deregisters itself when dropped, so the
    /// channel is released on every exit path of its owning connection.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().insert(id, tx);
        debug!("Subscriber {} connected ({} live)", id, self.subscriber_count());
        Subscription {
            id,
            rx,
            broadcaster: Arc::clone(self),
        }
    }

    /// Remove a subscriber channel. Removing an unknown id is a no-op.
    fn unsubscribe(&self, id: u64) {
        self.lock().remove(&id);
        debug!("Subscriber {} disconnected ({} live)", id, self.subscriber_count());
    }

    /// Push one event onto every live subscriber channel.
    ///
    /// Channels whose receiver is gone are pruned on the spot; every channel
    /// still live receives the event exactly once, in publish order.
    pub fn publish(&self, event: &ChangeEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        let mut subscribers = self.lock();
        subscribers.retain(|_, tx| tx.send(payload.clone()).is_ok());
        Ok(())
    }

    /// Number of currently-registered subscriber channels.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, mpsc::UnboundedSender<String>>> {
        // A poisoned subscriber set only means a panicked publish; the map
        // itself is still consistent.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One observer's registration with the broadcaster.
///
/// Holds the receiving end of the subscriber channel and unsubscribes
/// exactly once on drop.
pub struct Subscription {
    id: u64,
    rx: mpsc::UnboundedReceiver<String>,
    broadcaster: Arc<Broadcaster>,
}

impl Subscription {
    /// Wait for the next serialized event. Returns `None` if the channel is
    /// closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(self.id);
    }
}
