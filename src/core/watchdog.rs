//! # Timeout watchdog.
//!
//! ## Flow
//! ```text
//! WatcherStarted
//!   └─► sleep(T) ────────────────────────────── token cancelled ─► WatcherStopped
//!         └─► state.interrupt(Timeout)
//!               ├─ Lost/Sealed ─► InterruptIgnored ─► WatcherStopped
//!               └─ Won ─► InterruptRaised
//!                     └─► every T/10: state.renotify(Timeout) ─► Renotified{tick}
//!                           (until cancelled or state sealed)
//! ```
//!
//! ## Rules
//! - Fires at most once; re-notifies only while the cause is still `Timeout`.
//! - Missed ticks are delayed, never bursted: a stalled runtime gets one reminder, not ten.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::cause::InterruptCause;
use super::state::{Assign, InterruptState};
use crate::events::{Bus, Event, EventKind};

pub(crate) const NAME: &str = "watchdog";

/// Runs the watchdog until cancellation.
pub(crate) async fn run(
    state: Arc<InterruptState>,
    bus: Bus,
    timeout: Duration,
    every: Duration,
    token: CancellationToken,
) {
    bus.publish(
        Event::new(EventKind::WatcherStarted)
            .with_source(NAME)
            .with_timeout(timeout),
    );

    let fired = tokio::select! {
        _ = token.cancelled() => false,
        _ = time::sleep(timeout) => true,
    };
    if fired && raise(&state, &bus) {
        renotify_loop(&state, &bus, every, &token).await;
    }

    bus.publish(Event::new(EventKind::WatcherStopped).with_source(NAME));
}

fn raise(state: &InterruptState, bus: &Bus) -> bool {
    match state.interrupt(InterruptCause::Timeout) {
        Assign::Won => {
            bus.publish(
                Event::new(EventKind::InterruptRaised)
                    .with_source(NAME)
                    .with_cause(InterruptCause::Timeout),
            );
            true
        }
        Assign::Lost { existing } => {
            bus.publish(
                Event::new(EventKind::InterruptIgnored)
                    .with_source(NAME)
                    .with_cause(InterruptCause::Timeout)
                    .with_reason(existing.as_label()),
            );
            false
        }
        Assign::Sealed => false,
    }
}

async fn renotify_loop(
    state: &InterruptState,
    bus: &Bus,
    every: Duration,
    token: &CancellationToken,
) {
    let mut ticker = time::interval_at(Instant::now() + every, every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }
        let Some(tick) = state.renotify(InterruptCause::Timeout) else {
            return;
        };
        bus.publish(
            Event::new(EventKind::Renotified)
                .with_source(NAME)
                .with_cause(InterruptCause::Timeout)
                .with_tick(tick),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_fires_then_ticks() {
        let state = Arc::new(InterruptState::new());
        let bus = Bus::new(64);
        let mut rx = bus.subscribe();
        let token = CancellationToken::new();
        let task = tokio::spawn(run(
            state.clone(),
            bus.clone(),
            Duration::from_millis(500),
            Duration::from_millis(50),
            token.clone(),
        ));

        time::sleep(Duration::from_millis(499)).await;
        assert!(!state.snapshot().interrupted);

        time::sleep(Duration::from_millis(2)).await;
        let s = state.snapshot();
        assert!(s.interrupted);
        assert_eq!(s.cause, InterruptCause::Timeout);

        time::sleep(Duration::from_millis(50)).await;
        assert!(s.notifier.is_closed());

        token.cancel();
        task.await.unwrap();

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::WatcherStarted,
                EventKind::InterruptRaised,
                EventKind::Renotified,
                EventKind::WatcherStopped,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_loses_to_earlier_cause() {
        let state = Arc::new(InterruptState::new());
        state.interrupt(InterruptCause::AbortByOtherProcess);
        let parked = state.snapshot();

        let token = CancellationToken::new();
        let task = tokio::spawn(run(
            state.clone(),
            Bus::new(8),
            Duration::from_millis(10),
            Duration::from_millis(1),
            token,
        ));
        task.await.unwrap();

        assert_eq!(state.cause(), InterruptCause::AbortByOtherProcess);
        assert!(!parked.notifier.is_closed());
    }
}
