//! Sync coordinator: echo-free fan-out and typed dispatch.
//!
//! # Responsibility
//! - Own this instance's identity and its open broadcast channel.
//! - Tag outgoing envelopes and drop self-originated incoming ones.
//! - Dispatch incoming payloads to registered handlers by message kind.
//!
//! # Invariants
//! - `open` never fails: transport errors degrade to a sync-disabled
//!   coordinator, logged and otherwise invisible to the caller.
//! - Handlers for one kind run in registration order; a failing handler is
//!   logged and does not stop later handlers.
//! - Handler callbacks run without the registry lock held, so a handler may
//!   subscribe or unsubscribe reentrantly.
//!
//! # See also
//! - docs/architecture/sync-model.md

use crate::clock::now_epoch_ms;
use crate::sync::message::{SyncEnvelope, SyncMessageKind, SyncPayload};
use crate::sync::transport::{BroadcastHandle, BroadcastTransport};
use log::{error, info, warn};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};
use uuid::Uuid;

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

type Handler = Arc<dyn Fn(&SyncPayload) -> HandlerResult + Send + Sync>;

struct CoordinatorInner {
    instance_id: String,
    channel_name: String,
    handle: Mutex<Option<Arc<dyn BroadcastHandle>>>,
    handlers: RwLock<HashMap<SyncMessageKind, Vec<(usize, Handler)>>>,
    next_handler_id: AtomicUsize,
}

/// Per-instance sync coordinator. Cheap to clone; clones share identity,
/// channel and handler registry.
#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<CoordinatorInner>,
}

/// Keeps one handler registered; `unsubscribe()` or drop removes exactly
/// that handler.
pub struct SyncSubscription {
    inner: Weak<CoordinatorInner>,
    kind: SyncMessageKind,
    id: usize,
}

impl SyncCoordinator {
    /// Opens the broadcast channel through the injected transport.
    ///
    /// A transport failure leaves the coordinator in a degraded,
    /// sync-disabled state: `is_available()` reports `false`, `broadcast`
    /// returns `false`, and local operation continues unaffected.
    pub fn open(transport: &dyn BroadcastTransport, channel_name: &str) -> Self {
        let instance_id = generate_instance_id();
        let inner = Arc::new(CoordinatorInner {
            instance_id,
            channel_name: channel_name.to_string(),
            handle: Mutex::new(None),
            handlers: RwLock::new(HashMap::new()),
            next_handler_id: AtomicUsize::new(0),
        });

        let dispatch_target = Arc::downgrade(&inner);
        let on_message = Arc::new(move |raw: &str| {
            if let Some(inner) = dispatch_target.upgrade() {
                dispatch(&inner, raw);
            }
        });

        match transport.open(channel_name, on_message) {
            Ok(handle) => {
                *inner.handle.lock().unwrap() = Some(Arc::from(handle));
                info!(
                    "event=sync_open module=sync status=ok channel={} instance={}",
                    channel_name, inner.instance_id
                );
            }
            Err(err) => {
                warn!(
                    "event=sync_open module=sync status=error channel={} error={err}",
                    channel_name
                );
            }
        }

        Self { inner }
    }

    /// Identity of this running instance, stable for its lifetime.
    pub fn instance_id(&self) -> &str {
        &self.inner.instance_id
    }

    pub fn channel_name(&self) -> &str {
        &self.inner.channel_name
    }

    /// Whether broadcasting/receiving is currently possible.
    pub fn is_available(&self) -> bool {
        self.inner.handle.lock().unwrap().is_some()
    }

    /// Wraps `payload` into a tagged envelope and publishes it.
    ///
    /// Returns `false` — never an error — when the channel is unavailable
    /// or the publish fails; failures are logged.
    pub fn broadcast(&self, payload: SyncPayload) -> bool {
        let envelope = SyncEnvelope {
            payload,
            timestamp: now_epoch_ms(),
            source: self.inner.instance_id.clone(),
        };
        let raw = match serde_json::to_string(&envelope) {
            Ok(raw) => raw,
            Err(err) => {
                error!("event=sync_broadcast module=sync status=error error={err}");
                return false;
            }
        };

        // The publish runs outside the handle lock: delivery may be
        // synchronous and a receiving handler may broadcast in response.
        let Some(handle) = self.inner.handle.lock().unwrap().clone() else {
            return false;
        };
        match handle.publish(&raw) {
            Ok(()) => true,
            Err(err) => {
                error!(
                    "event=sync_broadcast module=sync status=error kind={} error={err}",
                    envelope.payload.kind().as_str()
                );
                false
            }
        }
    }

    /// Registers a handler for one message kind.
    ///
    /// Multiple handlers per kind are allowed and run in registration
    /// order. Handlers receive payloads originating from OTHER instances
    /// only; self-echoes are discarded before dispatch.
    pub fn subscribe<F>(&self, kind: SyncMessageKind, handler: F) -> SyncSubscription
    where
        F: Fn(&SyncPayload) -> HandlerResult + Send + Sync + 'static,
    {
        let id = self.inner.next_handler_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .write()
            .unwrap()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        SyncSubscription {
            inner: Arc::downgrade(&self.inner),
            kind,
            id,
        }
    }

    /// Releases the channel and clears all handler registrations.
    /// Idempotent: closing twice is not an error.
    pub fn close(&self) {
        let released = self.inner.handle.lock().unwrap().take();
        if let Some(handle) = released {
            handle.close();
            info!(
                "event=sync_close module=sync status=ok channel={} instance={}",
                self.inner.channel_name, self.inner.instance_id
            );
        }
        self.inner.handlers.write().unwrap().clear();
    }
}

fn generate_instance_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("tab-{}-{}", now_epoch_ms(), &suffix[..8])
}

fn dispatch(inner: &CoordinatorInner, raw: &str) {
    let envelope: SyncEnvelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            warn!("event=sync_receive module=sync status=error error={err}");
            return;
        }
    };

    // Echo suppression: our own broadcasts come back on the channel and
    // must not reach local handlers.
    if envelope.source == inner.instance_id {
        return;
    }

    let kind = envelope.payload.kind();
    let handlers: Vec<Handler> = {
        let registry = inner.handlers.read().unwrap();
        registry
            .get(&kind)
            .map(|entries| entries.iter().map(|(_, handler)| handler.clone()).collect())
            .unwrap_or_default()
    };
    for handler in handlers {
        if let Err(err) = handler(&envelope.payload) {
            error!(
                "event=sync_handler module=sync status=error kind={} error={err}",
                kind.as_str()
            );
        }
    }
}

impl SyncSubscription {
    /// Removes exactly this handler. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for SyncSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut registry = inner.handlers.write().unwrap();
            if let Some(entries) = registry.get_mut(&self.kind) {
                entries.retain(|(id, _)| *id != self.id);
                if entries.is_empty() {
                    registry.remove(&self.kind);
                }
            }
        }
    }
}
