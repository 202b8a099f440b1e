//! # Close-once notification signal.
//!
//! A [`Notifier`] is handed out inside every [`InterruptStatus`](super::InterruptStatus).
//! It closes on the *next* transition of the handler: the first interrupt, or a
//! later re-notification tick. Once closed it stays closed; the handler issues a
//! fresh, open notifier for the cycle after that.
//!
//! ```text
//! status() ─► notifier#1 (open) ── interrupt ──► notifier#1 closed
//! status() ─► notifier#2 (open) ── T/10 tick ──► notifier#2 closed
//! status() ─► notifier#3 (open) ── ...
//! ```
//!
//! Waiters must re-fetch `status()` after a closure to observe later ticks.

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// One-shot, payload-free, close-only signal.
///
/// Cheap to clone; clones observe the same closure. Only the owning handler
/// can close it.
#[derive(Clone, Debug, Default)]
pub struct Notifier {
    token: CancellationToken,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once the notifier has been closed.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the notifier is closed. Returns immediately if it already is.
    pub async fn closed(&self) {
        self.token.cancelled().await
    }

    /// Owned variant of [`closed`](Self::closed), handy for `tokio::select!`
    /// loops and for moving into spawned tasks.
    pub fn closed_owned(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }

    pub(crate) fn close(&self) {
        self.token.cancel();
    }
}
