//! Core domain logic for Timekeep.
//! This crate owns the multi-instance sync, undo/redo history and
//! optimistic-update invariants; UI surfaces stay thin on top of it.

pub mod clock;
pub mod config;
pub mod history;
pub mod logging;
pub mod model;
pub mod optimistic;
pub mod service;
pub mod store;
pub mod sync;

pub use config::{ConfigError, CoreConfig, DEFAULT_CHANNEL_NAME};
pub use history::{HistoryManager, Snapshot, DEFAULT_HISTORY_CAPACITY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{EntryDraft, EntryId, EntryPatch, EntryValidationError, TimeEntry};
pub use optimistic::OptimisticValue;
pub use service::entry_service::EntryService;
pub use service::session::CoreSession;
pub use store::entry_store::{
    EntryMutation, EntryStore, StoreError, StoreResult, StoreSubscription,
};
pub use sync::apply::{bind, SyncBinding};
pub use sync::coordinator::{HandlerResult, SyncCoordinator, SyncSubscription};
pub use sync::message::{BulkUpdate, SyncEnvelope, SyncMessageKind, SyncPayload};
pub use sync::transport::{
    BroadcastHandle, BroadcastTransport, InProcessTransport, MessageCallback, TransportError,
    UnsupportedTransport,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
