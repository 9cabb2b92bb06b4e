//! Open/closed lifecycle guard.
//!
//! The closed flag is the only facade state read from more than one
//! execution context, so it sits behind a mutex: a close() racing an
//! in-flight probe cycle is observed consistently by both sides.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// One-way open -> closed switch.
///
/// Starts open; [`Lifecycle::close`] flips it exactly once. There is no way
/// back.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    closed: Mutex<bool>,
}

impl Lifecycle {
    /// Create an open lifecycle.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether the facade has been closed.
    pub(crate) fn is_closed(&self) -> bool {
        *self.lock()
    }

    /// Flip to closed. Returns true only for the call that performed the
    /// transition, so close-once side effects can key off it.
    pub(crate) fn close(&self) -> bool {
        let mut closed = self.lock();
        if *closed {
            return false;
        }
        *closed = true;
        true
    }

    /// Lock the flag for a check-then-act sequence.
    pub(crate) fn lock(&self) -> MutexGuard<'_, bool> {
        self.closed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_open() {
        let lifecycle = Lifecycle::new();
        assert!(!lifecycle.is_closed());
    }

    #[test]
    fn close_is_one_way_and_idempotent() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.close());
        assert!(lifecycle.is_closed());
        // Second close is a no-op
        assert!(!lifecycle.close());
        assert!(lifecycle.is_closed());
    }
}
