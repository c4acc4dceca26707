//! Injected pub/sub capability for push events
//!
//! The tracker never binds a concrete transport; it subscribes through
//! [`EventSource`] and production wires in whatever pub/sub the
//! deployment uses. [`MemoryEventSource`] is the in-process
//! implementation used by tests and embedded demos.

use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of each subscription channel
const CHANNEL_CAPACITY: usize = 64;

/// A pub/sub transport the tracker can subscribe through
///
/// `subscribe` yields a receiver of raw JSON payloads for one
/// (channel, event) pair. Dropping the receiver ends the
/// subscription: teardown is scoped to the receiver's lifetime, so a
/// closed tracking view cannot leak listeners and cannot disturb
/// other consumers of the same channel.
pub trait EventSource: Send + Sync {
    fn subscribe(&self, channel: &str, event: &str) -> mpsc::Receiver<Value>;
}

struct Subscription {
    event: String,
    tx: mpsc::Sender<Value>,
}

/// In-process event source
///
/// Keeps a sender per live subscription, keyed by channel. Publishing
/// is fire-and-forget: a full subscriber drops the event, a closed
/// one is pruned.
#[derive(Default, Clone)]
pub struct MemoryEventSource {
    subs: Arc<Mutex<HashMap<String, Vec<Subscription>>>>,
}

impl MemoryEventSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a payload to every subscriber of (channel, event)
    ///
    /// Returns the number of subscribers the payload reached.
    pub fn publish(&self, channel: &str, event: &str, payload: Value) -> usize {
        let mut subs = self.subs.lock();
        let Some(entries) = subs.get_mut(channel) else {
            return 0;
        };

        let mut delivered = 0;
        entries.retain(|sub| {
            if sub.tx.is_closed() {
                return false;
            }
            if sub.event != event {
                return true;
            }
            match sub.tx.try_send(payload.clone()) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(channel, event, "Subscriber queue full, dropping event");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => false,
            }
        });
        if entries.is_empty() {
            subs.remove(channel);
        }
        delivered
    }

    /// Number of live subscriptions on a channel (test/teardown aid)
    pub fn subscription_count(&self, channel: &str) -> usize {
        self.subs
            .lock()
            .get(channel)
            .map_or(0, |entries| entries.iter().filter(|s| !s.tx.is_closed()).count())
    }
}

impl EventSource for MemoryEventSource {
    fn subscribe(&self, channel: &str, event: &str) -> mpsc::Receiver<Value> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.subs
            .lock()
            .entry(channel.to_string())
            .or_default()
            .push(Subscription {
                event: event.to_string(),
                tx,
            });
        tracing::debug!(channel, event, "Subscribed");
        rx
    }
}

impl std::fmt::Debug for MemoryEventSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEventSource")
            .field("channels", &self.subs.lock().len())
            .finish()
    }
}
