//! Domain model for time-entry records.
//!
//! # Responsibility
//! - Define the canonical time-entry record shared by all core layers.
//! - Keep wire-shape concerns (field naming, lenient numeric decoding) at
//!   the model boundary.
//!
//! # Invariants
//! - Every record is identified by a stable string `id`.
//! - `id` is immutable after creation; all other fields are replaceable.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod entry;
