//! Shared record-collection state container.
//!
//! # Responsibility
//! - Own the in-memory collection of time entries for one running instance.
//! - Expose the explicit `snapshot()` / `apply(mutation)` / `subscribe()`
//!   surface consumed by sync, history and service layers.
//!
//! # Invariants
//! - No two records share an `id`.
//! - Listeners are notified only when a mutation changed the collection.
//!
//! # See also
//! - docs/architecture/sync-model.md

pub mod entry_store;
