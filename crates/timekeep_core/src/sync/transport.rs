//! Broadcast capability seam and in-process implementation.
//!
//! # Responsibility
//! - Define the platform-agnostic contract the coordinator publishes and
//!   receives through.
//! - Provide an in-process hub for tests, the CLI probe and single-process
//!   embedding.
//!
//! # Invariants
//! - Delivery is fire-and-forget: publishing never blocks on receivers.
//! - Per-sender delivery order is preserved for a given receiver.
//! - The in-process hub delivers to every open handle on the channel,
//!   including the publisher's own; envelope `source` filtering is the only
//!   dedupe layer above it.
//!
//! A browser BroadcastChannel binding is an outer-surface concern; this
//! trait is its documented boundary.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};

pub type MessageCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Transport-level failures. All of them are recoverable by design: the
/// coordinator degrades to sync-disabled instead of surfacing them.
#[derive(Debug)]
pub enum TransportError {
    /// The platform does not expose a broadcast primitive.
    Unsupported,
    /// The handle (or its hub) is already closed.
    Closed,
    /// Publishing failed after the channel was opened.
    Publish(String),
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "broadcast capability is not supported here"),
            Self::Closed => write!(f, "broadcast channel is closed"),
            Self::Publish(reason) => write!(f, "broadcast publish failed: {reason}"),
        }
    }
}

impl Error for TransportError {}

/// Factory side of the capability: opens one named channel.
pub trait BroadcastTransport: Send + Sync {
    /// Opens `channel` and wires `on_message` for incoming raw messages.
    ///
    /// # Errors
    /// - `Unsupported` when the platform has no broadcast primitive.
    fn open(
        &self,
        channel: &str,
        on_message: MessageCallback,
    ) -> Result<Box<dyn BroadcastHandle>, TransportError>;
}

/// One open channel. Dropping the handle closes it.
pub trait BroadcastHandle: Send + Sync {
    /// Publishes one serialized message to every handle on the channel.
    fn publish(&self, message: &str) -> Result<(), TransportError>;

    /// Releases the channel; idempotent.
    fn close(&self);
}

struct Port {
    id: usize,
    on_message: MessageCallback,
}

#[derive(Default)]
struct Hub {
    channels: Mutex<HashMap<String, Vec<Port>>>,
    next_port_id: AtomicUsize,
}

/// Same-process broadcast hub.
///
/// Clones share one hub; every handle opened through any clone on the same
/// channel name sees every published message, synchronously and in send
/// order per publisher.
#[derive(Clone, Default)]
pub struct InProcessTransport {
    hub: Arc<Hub>,
}

impl InProcessTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BroadcastTransport for InProcessTransport {
    fn open(
        &self,
        channel: &str,
        on_message: MessageCallback,
    ) -> Result<Box<dyn BroadcastHandle>, TransportError> {
        let id = self.hub.next_port_id.fetch_add(1, Ordering::Relaxed);
        self.hub
            .channels
            .lock()
            .unwrap()
            .entry(channel.to_string())
            .or_default()
            .push(Port { id, on_message });

        Ok(Box::new(InProcessHandle {
            hub: Arc::downgrade(&self.hub),
            channel: channel.to_string(),
            id,
            closed: AtomicBool::new(false),
        }))
    }
}

struct InProcessHandle {
    hub: Weak<Hub>,
    channel: String,
    id: usize,
    closed: AtomicBool,
}

impl BroadcastHandle for InProcessHandle {
    fn publish(&self, message: &str) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        let hub = self.hub.upgrade().ok_or(TransportError::Closed)?;

        // Callbacks run outside the registry lock; a receiver may open or
        // close handles while handling a message.
        let callbacks: Vec<MessageCallback> = {
            let channels = hub.channels.lock().unwrap();
            channels
                .get(&self.channel)
                .map(|ports| ports.iter().map(|port| port.on_message.clone()).collect())
                .unwrap_or_default()
        };
        for callback in callbacks {
            callback(message);
        }
        Ok(())
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(hub) = self.hub.upgrade() {
            let mut channels = hub.channels.lock().unwrap();
            if let Some(ports) = channels.get_mut(&self.channel) {
                ports.retain(|port| port.id != self.id);
                if ports.is_empty() {
                    channels.remove(&self.channel);
                }
            }
        }
    }
}

impl Drop for InProcessHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Transport for platforms without a broadcast primitive; `open` always
/// fails, which drives the coordinator into its degraded mode.
#[derive(Clone, Copy, Default)]
pub struct UnsupportedTransport;

impl BroadcastTransport for UnsupportedTransport {
    fn open(
        &self,
        _channel: &str,
        _on_message: MessageCallback,
    ) -> Result<Box<dyn BroadcastHandle>, TransportError> {
        Err(TransportError::Unsupported)
    }
}
