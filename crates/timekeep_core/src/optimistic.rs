//! Optimistic single-value updates with deterministic rollback.
//!
//! # Responsibility
//! - Show a speculative value immediately, then reconcile with the outcome
//!   of a slower confirming operation.
//!
//! # Invariants
//! - The rollback target is captured before the speculative write.
//! - A failed confirmation restores the rollback target, records the error
//!   on the slot and re-raises it to the caller.
//! - A confirmation that returns a value wins over the speculative guess.
//!
//! Overlapping `update` calls are last-write-wins: the second call captures
//! whatever value is visible at that moment, including the first call's
//! still-unconfirmed guess. Callers needing stricter behavior must
//! serialize their updates (see DESIGN.md, open questions).

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex};

struct SlotState<T> {
    value: T,
    previous: T,
    pending: bool,
    last_error: Option<String>,
}

/// One piece of UI-visible state with speculative update support.
///
/// Clones share the slot, so a view and the code driving the confirmation
/// can observe the same value.
#[derive(Clone)]
pub struct OptimisticValue<T> {
    inner: Arc<OptimisticInner<T>>,
}

struct OptimisticInner<T> {
    initial: T,
    state: Mutex<SlotState<T>>,
}

impl<T: Clone> OptimisticValue<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(OptimisticInner {
                state: Mutex::new(SlotState {
                    value: initial.clone(),
                    previous: initial.clone(),
                    pending: false,
                    last_error: None,
                }),
                initial,
            }),
        }
    }

    /// Currently visible value — speculative while a confirmation is
    /// pending, settled otherwise.
    pub fn value(&self) -> T {
        self.inner.state.lock().unwrap().value.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.state.lock().unwrap().pending
    }

    /// Failure message of the most recent rejected confirmation, cleared by
    /// the next `update` or by `reset`.
    pub fn last_error(&self) -> Option<String> {
        self.inner.state.lock().unwrap().last_error.clone()
    }

    /// Applies `optimistic` immediately, then settles on `operation`.
    ///
    /// The confirming operation resolves to `Ok(Some(value))` to adopt a
    /// server-assigned result, `Ok(None)` to keep the speculative value, or
    /// `Err` to roll back. Returns the settled visible value.
    ///
    /// # Errors
    /// Re-raises the confirmation failure after rolling back; the slot
    /// additionally records it for display (`last_error`).
    pub async fn update<F, Fut, E>(&self, optimistic: T, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        E: Display,
    {
        {
            let mut state = self.inner.state.lock().unwrap();
            state.previous = state.value.clone();
            state.value = optimistic;
            state.pending = true;
            state.last_error = None;
        }

        match operation().await {
            Ok(confirmed) => {
                let mut state = self.inner.state.lock().unwrap();
                if let Some(value) = confirmed {
                    state.value = value;
                }
                state.pending = false;
                Ok(state.value.clone())
            }
            Err(err) => {
                let mut state = self.inner.state.lock().unwrap();
                state.value = state.previous.clone();
                state.pending = false;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Restores the initial value and clears error and pending state,
    /// unconditionally.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock().unwrap();
        state.value = self.inner.initial.clone();
        state.previous = self.inner.initial.clone();
        state.pending = false;
        state.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::OptimisticValue;

    #[test]
    fn new_slot_is_settled_on_the_initial_value() {
        let slot = OptimisticValue::new(7_u32);

        assert_eq!(slot.value(), 7);
        assert!(!slot.is_pending());
        assert_eq!(slot.last_error(), None);
    }

    #[test]
    fn reset_clears_everything_back_to_initial() {
        let slot = OptimisticValue::new("on".to_string());
        {
            let mut state = slot.inner.state.lock().unwrap();
            state.value = "off".to_string();
            state.pending = true;
            state.last_error = Some("boom".to_string());
        }

        slot.reset();
        assert_eq!(slot.value(), "on");
        assert!(!slot.is_pending());
        assert_eq!(slot.last_error(), None);
    }
}
