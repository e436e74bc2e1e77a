//! Use-case services for locally-authored mutations.
//!
//! # Responsibility
//! - Orchestrate the per-action sequence: history push, local apply, sync
//!   broadcast.
//! - Keep UI layers decoupled from store/sync/history wiring.
//!
//! # See also
//! - docs/architecture/sync-model.md

pub mod entry_service;
pub mod session;
