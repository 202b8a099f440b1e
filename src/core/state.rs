//! # Interrupt state: the single mutation path for all watchers.
//!
//! Holds `{interrupted, cause, notifier}` behind one mutex so that
//! "first cause wins" is decided atomically and readers never see a torn pair.
//!
//! ## Rules
//! - `cause` is assigned at most once; later [`InterruptState::interrupt`] calls are no-ops.
//! - Every successful transition closes the current notifier and installs a fresh one.
//! - [`InterruptState::renotify`] only swaps notifiers while the expected cause is in place.
//! - After [`InterruptState::seal`] nothing changes any more.
//! - The lock is never held across an `.await`.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::cause::InterruptCause;
use super::notifier::Notifier;

/// Immutable snapshot of a handler's interrupt state.
#[derive(Clone, Debug)]
pub struct InterruptStatus {
    /// `true` once any source fired.
    pub interrupted: bool,
    /// Why it fired ([`InterruptCause::None`] while not interrupted).
    pub cause: InterruptCause,
    /// Closes on the next transition or re-notification tick.
    pub notifier: Notifier,
}

/// Outcome of an [`InterruptState::interrupt`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Assign {
    /// The cause was assigned by this call.
    Won,
    /// Another cause was already in place.
    Lost { existing: InterruptCause },
    /// The state is sealed.
    Sealed,
}

#[derive(Debug)]
struct Inner {
    interrupted: bool,
    cause: InterruptCause,
    notifier: Notifier,
    ticks: u64,
    sealed: bool,
}

/// Lock-guarded interrupt record shared by a handler and its watchers.
#[derive(Debug)]
pub(crate) struct InterruptState {
    inner: Mutex<Inner>,
}

impl InterruptState {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                interrupted: false,
                cause: InterruptCause::None,
                notifier: Notifier::new(),
                ticks: 0,
                sealed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Nothing inside can be left half-updated by a panic; keep going.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current snapshot.
    pub(crate) fn snapshot(&self) -> InterruptStatus {
        let inner = self.lock();
        InterruptStatus {
            interrupted: inner.interrupted,
            cause: inner.cause,
            notifier: inner.notifier.clone(),
        }
    }

    /// Returns the current cause.
    pub(crate) fn cause(&self) -> InterruptCause {
        self.lock().cause
    }

    /// Tries to assign `cause`; on success flips `interrupted` and cycles the notifier.
    pub(crate) fn interrupt(&self, cause: InterruptCause) -> Assign {
        debug_assert!(cause.is_interrupt());
        let mut inner = self.lock();
        if inner.sealed {
            return Assign::Sealed;
        }
        if inner.cause.is_interrupt() {
            return Assign::Lost {
                existing: inner.cause,
            };
        }
        inner.interrupted = true;
        inner.cause = cause;
        Self::cycle(&mut inner);
        Assign::Won
    }

    /// Closes the current notifier and installs a fresh one, if `expected` is the
    /// current cause. Returns the new tick number.
    pub(crate) fn renotify(&self, expected: InterruptCause) -> Option<u64> {
        let mut inner = self.lock();
        if inner.sealed || !inner.interrupted || inner.cause != expected {
            return None;
        }
        inner.ticks += 1;
        Self::cycle(&mut inner);
        Some(inner.ticks)
    }

    /// Freezes the state: no further transitions or notifier closures.
    pub(crate) fn seal(&self) {
        self.lock().sealed = true;
    }

    fn cycle(inner: &mut Inner) {
        let next = Notifier::new();
        std::mem::replace(&mut inner.notifier, next).close();
    }
}
