//! # InterruptHandler: the one type a test engine talks to.
//!
//! Owns the [`InterruptState`], the event [`Bus`], the stack inspector and the
//! watcher tasks started by [`InterruptHandlerBuilder`].
//!
//! ## Architecture
//! ```text
//! InterruptHandlerBuilder::build()
//!   ├─► watchdog::run        ─┐
//!   ├─► remote::run          ─┼─► InterruptState (one mutex)   ◄── status()
//!   └─► signals::run         ─┘        │
//!          │ (JoinSet, child tokens)   └─► Notifier closes on every transition/tick
//!          ▼
//!         Bus ──► listener ──► SubscriberSet
//!
//! stop():
//!   seal state ─► cancel watchers ─► join watchers ─► HandlerStopped
//!              ─► cancel listener ─► drain bus ─► SubscriberSet::shutdown
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use haltwatch::{InterruptCause, InterruptHandler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let handler = InterruptHandler::new(Duration::from_millis(20), "");
//!
//!     let status = handler.status();
//!     assert!(!status.interrupted);
//!     status.notifier.closed().await;
//!
//!     assert_eq!(handler.status().cause, InterruptCause::Timeout);
//!     assert!(handler
//!         .interrupt_message_with_stack_traces()
//!         .starts_with("Interrupted by Timeout\n\n"));
//!
//!     handler.stop().await;
//! }
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::builder::InterruptHandlerBuilder;
use super::message;
use super::state::{InterruptState, InterruptStatus};
use crate::config::InterruptConfig;
use crate::events::{Bus, Event, EventKind};
use crate::stack::StackInspector;
use crate::subscribers::SubscriberSet;

/// Background activity owned by a running handler.
pub(crate) struct Tasks {
    pub(crate) watchers_token: CancellationToken,
    pub(crate) watchers: JoinSet<()>,
    pub(crate) listener_token: CancellationToken,
    pub(crate) listener: Option<JoinHandle<()>>,
}

/// Merges watchdog timeouts, peer aborts and (optionally) OS signals into one
/// observable interrupt status.
///
/// Every instance is independent: no process-wide state is shared between handlers.
pub struct InterruptHandler {
    cfg: InterruptConfig,
    state: Arc<InterruptState>,
    bus: Bus,
    inspector: Arc<dyn StackInspector>,
    tasks: Mutex<Option<Tasks>>,
}

impl InterruptHandler {
    /// Creates and starts a handler with default settings.
    ///
    /// - `timeout > 0` starts the watchdog.
    /// - a non-empty `coordinator_address` starts the remote abort watcher
    ///   against a [`TcpCoordinator`](crate::TcpCoordinator).
    ///
    /// Never fails: a malformed or unreachable address only means the remote
    /// watcher never fires. Must be called from within a Tokio runtime.
    pub fn new(timeout: Duration, coordinator_address: impl Into<String>) -> Self {
        let cfg = InterruptConfig {
            timeout,
            coordinator_address: coordinator_address.into(),
            ..InterruptConfig::default()
        };
        Self::builder(cfg).build()
    }

    /// Returns a builder for full control over sources, inspector and subscribers.
    pub fn builder(cfg: InterruptConfig) -> InterruptHandlerBuilder {
        InterruptHandlerBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: InterruptConfig,
        state: Arc<InterruptState>,
        bus: Bus,
        inspector: Arc<dyn StackInspector>,
        tasks: Tasks,
    ) -> Self {
        Self {
            cfg,
            state,
            bus,
            inspector,
            tasks: Mutex::new(Some(tasks)),
        }
    }

    /// Returns the current snapshot. Never blocks.
    ///
    /// The snapshot's notifier closes on the *next* transition: the first
    /// interrupt, or a later re-notification tick. Call `status()` again after it
    /// closes to wait for the one after.
    pub fn status(&self) -> InterruptStatus {
        self.state.snapshot()
    }

    /// Composes the diagnostic message for the current cause.
    ///
    /// Timeout (and signal) messages carry a stack capture; peer-abort messages do not.
    pub fn interrupt_message_with_stack_traces(&self) -> String {
        message::compose(
            self.state.cause(),
            &self.cfg.peer_label,
            self.inspector.as_ref(),
        )
    }

    /// Subscribes to this handler's events (only events published afterwards).
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Returns the configuration this handler was built with.
    pub fn config(&self) -> &InterruptConfig {
        &self.cfg
    }

    /// Stops all background activity and waits for it to finish.
    ///
    /// After this returns no notifier closes and no state changes, even if the
    /// configured timeout elapses later. Subscribers have received every event
    /// published up to and including `HandlerStopped`.
    ///
    /// Calling it again is a no-op.
    pub async fn stop(&self) {
        // Seal first: a concurrent second call may return as soon as the tasks are gone.
        self.state.seal();
        let Some(mut tasks) = self.take_tasks() else {
            return;
        };

        tasks.watchers_token.cancel();
        while tasks.watchers.join_next().await.is_some() {}

        self.bus.publish(Event::new(EventKind::HandlerStopped));
        tasks.listener_token.cancel();
        if let Some(listener) = tasks.listener {
            let _ = listener.await;
        }
    }

    fn take_tasks(&self) -> Option<Tasks> {
        self.tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for InterruptHandler {
    /// Best effort for handlers dropped without `stop()`: seal and cancel.
    /// Watchers are aborted with their `JoinSet`; nothing is awaited.
    fn drop(&mut self) {
        if let Some(tasks) = self.take_tasks() {
            self.state.seal();
            tasks.watchers_token.cancel();
            tasks.listener_token.cancel();
        }
    }
}

/// Forwards bus events into the subscriber set until cancelled, then drains.
pub(crate) async fn listen(
    mut rx: broadcast::Receiver<Event>,
    subs: SubscriberSet,
    token: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            msg = rx.recv() => match msg {
                Ok(ev) => subs.emit(&ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = token.cancelled() => break,
        }
    }

    loop {
        match rx.try_recv() {
            Ok(ev) => subs.emit(&ev),
            Err(TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    subs.shutdown().await;
}
