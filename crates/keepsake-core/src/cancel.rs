#![forbid(unsafe_code)]

//! One-way cancellation tokens for pending timers.
//!
//! A state machine that arms a timer keeps one clone of the token; the timer
//! keeps another and stops emitting as soon as the token is cancelled.
//! Cancellation never un-happens.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable, thread-safe cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a live (not cancelled) token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the token. Idempotent.
    ///
    /// Returns `true` if this call performed the cancellation.
    pub fn cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    /// Whether the token has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Whether two handles refer to the same token.
    #[must_use]
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_live() {
        assert!(!CancelToken::new().is_cancelled());
    }

    #[test]
    fn cancel_is_one_way_and_idempotent() {
        let token = CancelToken::new();
        assert!(token.cancel());
        assert!(!token.cancel());
        assert!(token.is_cancelled());
    }

    #[test]
    fn clones_observe_cancellation() {
        let armed = CancelToken::new();
        let timer_side = armed.clone();
        assert!(armed.same_as(&timer_side));
        armed.cancel();
        assert!(timer_side.is_cancelled());
        assert!(!armed.same_as(&CancelToken::new()));
    }

    #[test]
    fn cancellation_crosses_threads() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || {
            remote.cancel();
        })
        .join()
        .unwrap();
        assert!(token.is_cancelled());
    }
}
