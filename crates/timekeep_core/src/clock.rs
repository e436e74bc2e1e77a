//! Wall-clock access for mutation and envelope timestamps.
//!
//! # Invariants
//! - Timestamps are epoch milliseconds.
//! - Clock reads never panic; a clock before the epoch degrades to 0.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in epoch milliseconds.
///
/// Cross-instance clock skew is possible; timestamps are informational and
/// never used for conflict resolution.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
