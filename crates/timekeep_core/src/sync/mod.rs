//! Cross-instance synchronization over a broadcast capability.
//!
//! # Responsibility
//! - Define the stable message envelope exchanged between instances.
//! - Wrap the platform broadcast primitive behind an injectable seam.
//! - Fan local mutations out to peers and apply theirs locally, echo-free.
//!
//! # Invariants
//! - A receiving instance discards every envelope whose `source` equals its
//!   own identity (echo suppression).
//! - Remotely received mutations never re-broadcast and never create undo
//!   history.
//! - Transport failures degrade to a sync-disabled instance; they never
//!   propagate to the host application.
//!
//! # See also
//! - docs/architecture/sync-model.md

pub mod apply;
pub mod coordinator;
pub mod message;
pub mod transport;
