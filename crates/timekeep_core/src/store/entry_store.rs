//! Entry collection container and mutation semantics.
//!
//! # Responsibility
//! - Apply the closed set of collection mutations idempotently.
//! - Notify subscribed listeners after state-changing mutations.
//!
//! # Invariants
//! - `id` uniqueness is enforced by at-most-once insert, never by panic.
//! - Mutations for absent ids are silent no-ops (idempotent re-delivery).
//! - Listener callbacks run without any store lock held, so a listener may
//!   read the store or manage subscriptions reentrantly.

use crate::clock::now_epoch_ms;
use crate::model::entry::{EntryPatch, EntryValidationError, TimeEntry};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, Weak};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by store write paths.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    Validation(EntryValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<EntryValidationError> for StoreError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Closed set of collection mutations.
///
/// The same enumeration backs locally-authored edits and remotely received
/// sync messages, so dispatch sites can be matched exhaustively.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryMutation {
    /// Insert a record; no-op when the id is already present.
    Add(TimeEntry),
    /// Merge a partial update into the record with this id; no-op when
    /// absent (deleted records are not resurrected).
    Update { id: String, patch: EntryPatch },
    /// Remove the record with this id; no-op when absent.
    Delete { id: String },
    /// Remove every record whose id is in the set.
    BulkDelete { ids: Vec<String> },
    /// Overwrite the category of every record whose id is in the set.
    BulkSetCategory { ids: Vec<String>, category_id: String },
    /// Empty the collection unconditionally.
    Clear,
}

type Listener = Arc<dyn Fn(&[TimeEntry]) + Send + Sync>;

struct StoreInner {
    entries: RwLock<Vec<TimeEntry>>,
    listeners: RwLock<HashMap<usize, Listener>>,
    next_listener_id: AtomicUsize,
}

/// Shared handle to one instance's record collection.
///
/// Cloning is cheap and every clone refers to the same collection; the sync
/// binding, the history manager and the service layer each hold one.
#[derive(Clone)]
pub struct EntryStore {
    inner: Arc<StoreInner>,
}

/// Keeps a store listener registered; dropping it unsubscribes.
pub struct StoreSubscription {
    inner: Weak<StoreInner>,
    id: usize,
}

impl Default for EntryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(Vec::new()),
                listeners: RwLock::new(HashMap::new()),
                next_listener_id: AtomicUsize::new(0),
            }),
        }
    }

    /// Full copy of the collection in insertion order.
    pub fn snapshot(&self) -> Vec<TimeEntry> {
        self.inner.entries.read().unwrap().clone()
    }

    /// Looks up one record by id.
    pub fn get(&self, id: &str) -> Option<TimeEntry> {
        self.inner
            .entries
            .read()
            .unwrap()
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().unwrap().is_empty()
    }

    /// Applies one mutation and reports whether the collection changed.
    ///
    /// # Errors
    /// - `Validation` when an `Add` carries an invalid record. All other
    ///   mutations cannot fail; unknown ids degrade to no-ops.
    pub fn apply(&self, mutation: EntryMutation) -> StoreResult<bool> {
        let changed = {
            let mut entries = self.inner.entries.write().unwrap();
            match mutation {
                EntryMutation::Add(entry) => {
                    entry.validate()?;
                    if entries.iter().any(|existing| existing.id == entry.id) {
                        false
                    } else {
                        entries.push(entry);
                        true
                    }
                }
                EntryMutation::Update { id, patch } => {
                    match entries.iter_mut().find(|entry| entry.id == id) {
                        Some(entry) => {
                            entry.apply_patch(&patch, now_epoch_ms());
                            true
                        }
                        None => false,
                    }
                }
                EntryMutation::Delete { id } => {
                    let before = entries.len();
                    entries.retain(|entry| entry.id != id);
                    entries.len() != before
                }
                EntryMutation::BulkDelete { ids } => {
                    let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
                    let before = entries.len();
                    entries.retain(|entry| !targets.contains(entry.id.as_str()));
                    entries.len() != before
                }
                EntryMutation::BulkSetCategory { ids, category_id } => {
                    let targets: HashSet<&str> = ids.iter().map(String::as_str).collect();
                    let now_ms = now_epoch_ms();
                    let mut touched = false;
                    for entry in entries
                        .iter_mut()
                        .filter(|entry| targets.contains(entry.id.as_str()))
                    {
                        entry.category_id = category_id.clone();
                        entry.category = Some(category_id.clone());
                        entry.updated_at_ms = Some(now_ms);
                        touched = true;
                    }
                    touched
                }
                EntryMutation::Clear => {
                    if entries.is_empty() {
                        false
                    } else {
                        entries.clear();
                        true
                    }
                }
            }
        };

        if changed {
            self.notify();
        }
        Ok(changed)
    }

    /// Replaces the whole collection.
    ///
    /// Local-only operation used by history restore and import; it is not
    /// part of the sync mutation enumeration and is never broadcast.
    pub fn replace_all(&self, entries: Vec<TimeEntry>) {
        {
            let mut current = self.inner.entries.write().unwrap();
            *current = entries;
        }
        self.notify();
    }

    /// Registers a listener invoked with a snapshot after each change.
    pub fn subscribe<F>(&self, listener: F) -> StoreSubscription
    where
        F: Fn(&[TimeEntry]) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .write()
            .unwrap()
            .insert(id, Arc::new(listener));
        StoreSubscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    fn notify(&self) {
        // Snapshot state and listener set first; callbacks must run without
        // locks held so they can touch the store again.
        let snapshot = self.snapshot();
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .unwrap()
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

impl StoreSubscription {
    /// Removes exactly this listener. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {}
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.write().unwrap().remove(&self.id);
        }
    }
}
