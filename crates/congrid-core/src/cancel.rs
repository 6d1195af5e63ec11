#![forbid(unsafe_code)]

//! Shared cancellation token.
//!
//! The scanner thread blocks waiting for console input; teardown must be
//! able to interrupt that wait promptly. [`CancelToken`] is a one-shot latch
//! shared between the lifecycle code (which trips it) and the backend wait
//! (which observes it). Once tripped it stays tripped; a fresh token is
//! created per engaged session.
//!
//! # Contract
//!
//! - `trip()` is idempotent and wakes every waiter.
//! - When a waiter observes both cancellation and input readiness at once,
//!   cancellation wins.

use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct Inner {
    tripped: Mutex<bool>,
    cond: Condvar,
}

/// A cloneable one-shot cancellation latch.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Create a new, untripped token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token, waking all waiters. Idempotent.
    pub fn trip(&self) {
        let mut tripped = self
            .inner
            .tripped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *tripped = true;
        drop(tripped);
        self.inner.cond.notify_all();
    }

    /// Check whether the token has been tripped.
    #[must_use]
    pub fn is_tripped(&self) -> bool {
        *self
            .inner
            .tripped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Block until the token trips or `timeout` elapses.
    ///
    /// Returns `true` if the token was tripped.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let tripped = self
            .inner
            .tripped
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *tripped {
            return true;
        }
        let (tripped, _) = self
            .inner
            .cond
            .wait_timeout(tripped, timeout)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *tripped
    }
}
