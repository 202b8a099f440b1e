//! # OS signal interrupt source (opt-in).
//!
//! Enabled with [`InterruptConfig::os_signals`](crate::InterruptConfig::os_signals).
//!
//! ## Signals
//! **Unix platforms:** `SIGINT` (Ctrl-C), `SIGTERM`, `SIGQUIT`
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! ## Rules
//! - First signal assigns [`InterruptCause::Signal`] (if no other cause won first).
//! - Every further signal re-notifies while the cause is still `Signal`, so an
//!   operator hammering Ctrl-C on a hung run gets a fresh stack dump each time.
//! - Registration failure publishes `WatcherFailed`; the handler keeps working.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::cause::InterruptCause;
use super::state::{Assign, InterruptState};
use crate::events::{Bus, Event, EventKind};

pub(crate) const NAME: &str = "os-signal";

/// Independent listeners for the termination signals of this platform.
struct SignalListener {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigquit: tokio::signal::unix::Signal,
}

impl SignalListener {
    #[cfg(unix)]
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    #[cfg(not(unix))]
    fn register() -> std::io::Result<Self> {
        Ok(Self {})
    }

    /// Waits for the next signal.
    #[cfg(unix)]
    async fn recv(&mut self) -> std::io::Result<()> {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
        Ok(())
    }

    /// Waits for the next signal.
    #[cfg(not(unix))]
    async fn recv(&mut self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}

/// Runs the signal watcher until cancellation.
pub(crate) async fn run(state: Arc<InterruptState>, bus: Bus, token: CancellationToken) {
    let mut listener = match SignalListener::register() {
        Ok(l) => l,
        Err(e) => {
            bus.publish(
                Event::new(EventKind::WatcherFailed)
                    .with_source(NAME)
                    .with_reason(e.to_string()),
            );
            return;
        }
    };
    bus.publish(Event::new(EventKind::WatcherStarted).with_source(NAME));

    loop {
        let received = tokio::select! {
            _ = token.cancelled() => break,
            res = listener.recv() => res,
        };
        if let Err(e) = received {
            bus.publish(
                Event::new(EventKind::WatcherFailed)
                    .with_source(NAME)
                    .with_reason(e.to_string()),
            );
            break;
        }
        on_signal(&state, &bus);
    }

    bus.publish(Event::new(EventKind::WatcherStopped).with_source(NAME));
}

fn on_signal(state: &InterruptState, bus: &Bus) {
    let cause = InterruptCause::Signal;
    match state.interrupt(cause) {
        Assign::Won => bus.publish(
            Event::new(EventKind::InterruptRaised)
                .with_source(NAME)
                .with_cause(cause),
        ),
        Assign::Lost { existing } => match state.renotify(cause) {
            Some(tick) => bus.publish(
                Event::new(EventKind::Renotified)
                    .with_source(NAME)
                    .with_cause(cause)
                    .with_tick(tick),
            ),
            None => bus.publish(
                Event::new(EventKind::InterruptIgnored)
                    .with_source(NAME)
                    .with_cause(cause)
                    .with_reason(existing.as_label()),
            ),
        },
        Assign::Sealed => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_signals_renotify() {
        let state = InterruptState::new();
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        on_signal(&state, &bus);
        let first = state.snapshot();
        on_signal(&state, &bus);

        assert_eq!(state.cause(), InterruptCause::Signal);
        assert!(first.notifier.is_closed());
        assert_eq!(rx.try_recv().unwrap().kind, EventKind::InterruptRaised);
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::Renotified);
        assert_eq!(ev.tick, Some(1));
    }

    #[test]
    fn test_signal_after_timeout_is_ignored() {
        let state = InterruptState::new();
        state.interrupt(InterruptCause::Timeout);
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        let current = state.snapshot();

        on_signal(&state, &bus);

        assert_eq!(state.cause(), InterruptCause::Timeout);
        assert!(!current.notifier.is_closed());
        let ev = rx.try_recv().unwrap();
        assert_eq!(ev.kind, EventKind::InterruptIgnored);
        assert_eq!(ev.reason.as_deref(), Some("timeout"));
    }
}
