//! # Remote abort watcher.
//!
//! Short-polls a [`Coordinator`] for an abort posted by a sibling process.
//!
//! ## Flow
//! ```text
//! WatcherStarted
//! loop {
//!   ├─► is_aborted(group) bounded by request_timeout (cancellable)
//!   │     ├─ Ok(true)  ─► state.interrupt(AbortByOtherProcess) ─► Raised/Ignored ─► exit
//!   │     ├─ Ok(false) ─► [CoordinatorRecovered if a streak ended] ─► wait poll_interval
//!   │     └─ Err/timeout ─► [CoordinatorUnavailable on first failure] ─► wait backoff.next(n)
//!   └─► wait (cancellable)
//! }
//! WatcherStopped
//! ```
//!
//! ## Rules
//! - Fires at most once; no self-loop after a peer abort.
//! - Coordinator failures never leave this task: an unreachable service just means
//!   this source never fires.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use super::cause::InterruptCause;
use super::state::{Assign, InterruptState};
use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;

pub(crate) const NAME: &str = "remote-abort";

/// Polling parameters, extracted from [`InterruptConfig`](crate::InterruptConfig).
#[derive(Clone, Debug)]
pub(crate) struct RemoteParams {
    pub group: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub backoff: BackoffPolicy,
}

/// Runs the watcher until it fires or is cancelled.
pub(crate) async fn run(
    state: Arc<InterruptState>,
    bus: Bus,
    coordinator: Arc<dyn Coordinator>,
    params: RemoteParams,
    token: CancellationToken,
) {
    bus.publish(Event::new(EventKind::WatcherStarted).with_source(NAME));
    let mut failures: u32 = 0;

    loop {
        let polled = tokio::select! {
            _ = token.cancelled() => break,
            res = poll_once(coordinator.as_ref(), &params) => res,
        };

        let delay = match polled {
            Ok(true) => {
                raise(&state, &bus);
                break;
            }
            Ok(false) => {
                if failures > 0 {
                    bus.publish(
                        Event::new(EventKind::CoordinatorRecovered)
                            .with_source(coordinator.name())
                            .with_attempt(failures),
                    );
                    failures = 0;
                }
                params.poll_interval
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                if failures == 1 {
                    bus.publish(
                        Event::new(EventKind::CoordinatorUnavailable)
                            .with_source(coordinator.name())
                            .with_attempt(failures)
                            .with_reason(e.as_message()),
                    );
                }
                params.backoff.next(failures - 1)
            }
        };

        tokio::select! {
            _ = token.cancelled() => break,
            _ = time::sleep(delay) => {}
        }
    }

    bus.publish(Event::new(EventKind::WatcherStopped).with_source(NAME));
}

async fn poll_once(
    coordinator: &dyn Coordinator,
    params: &RemoteParams,
) -> Result<bool, CoordinatorError> {
    match time::timeout(params.request_timeout, coordinator.is_aborted(&params.group)).await {
        Ok(res) => res,
        Err(_elapsed) => Err(CoordinatorError::Timeout {
            timeout: params.request_timeout,
        }),
    }
}

fn raise(state: &InterruptState, bus: &Bus) {
    let cause = InterruptCause::AbortByOtherProcess;
    match state.interrupt(cause) {
        Assign::Won => bus.publish(
            Event::new(EventKind::InterruptRaised)
                .with_source(NAME)
                .with_cause(cause),
        ),
        Assign::Lost { existing } => bus.publish(
            Event::new(EventKind::InterruptIgnored)
                .with_source(NAME)
                .with_cause(cause)
                .with_reason(existing.as_label()),
        ),
        Assign::Sealed => {}
    }
}
