//! # haltwatch
//!
//! **haltwatch** is the interrupt core of a parallel test runner.
//!
//! Every worker process of a run gets one [`InterruptHandler`]. It merges several
//! independent sources into a single observable "stop now" status, remembers
//! *why* it fired, and can produce a diagnostic message with a stack capture of
//! everything that was running at that moment.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌────────────────┐   ┌──────────────────────┐   ┌────────────────┐
//!   │ Timeout        │   │ Remote abort watcher │   │ Signal watcher │
//!   │ watchdog       │   │ (polls Coordinator)  │   │ (opt-in)       │
//!   │ T, then T/10   │   │ fires once           │   │ SIGINT/TERM    │
//!   └───────┬────────┘   └──────────┬───────────┘   └───────┬────────┘
//!           │ interrupt(Timeout)    │ interrupt(Abort…)     │ interrupt(Signal)
//!           ▼                       ▼                       ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  InterruptState (one mutex)                                       │
//! │  - interrupted: bool           (false → true once)                │
//! │  - cause: InterruptCause       (first cause wins)                 │
//! │  - notifier: Notifier          (closed + replaced on every tick)  │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!            InterruptHandler::status() ─► InterruptStatus snapshot
//!            InterruptHandler::interrupt_message_with_stack_traces()
//!
//! Watchers ── publish(Event) ──► Bus ──► listener ──► SubscriberSet ──► Subscribe::on_event
//! ```
//!
//! ### Lifecycle
//! ```text
//! InterruptHandler::new / builder().build()
//!   ├─► timeout > 0          ─► spawn watchdog
//!   ├─► coordinator present  ─► spawn remote abort watcher
//!   └─► os_signals           ─► spawn signal watcher
//!
//! engine loop:
//!   let status = handler.status();
//!   select! { _ = status.notifier.closed() => report(handler.interrupt_message_with_stack_traces()),
//!             _ = run_spec() => {} }
//!
//! handler.stop().await   (seal ─► cancel ─► join; no activity survives)
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                              |
//! |-------------------|--------------------------------------------------------------|-------------------------------------------------|
//! | **Handler**       | One merged interrupt status per worker.                      | [`InterruptHandler`], [`InterruptStatus`]       |
//! | **Notification**  | Close-once signals, renewed on every re-notification tick.   | [`Notifier`], [`InterruptCause`]                |
//! | **Coordination**  | Cross-process abort broadcasts behind a narrow trait.        | [`Coordinator`], [`CoordinatorServer`]          |
//! | **Diagnostics**   | Stack capture for timeout messages.                          | [`StackInspector`], [`BacktraceInspector`]      |
//! | **Subscriber API**| Hook into interrupt events (logging, metrics, recorders).    | [`Subscribe`], [`Event`]                        |
//! | **Errors**        | Typed errors for collaborators.                              | [`CoordinatorError`], [`StackError`]            |
//! | **Configuration** | Centralized settings.                                        | [`InterruptConfig`], [`BackoffPolicy`]          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//! - `taskdump`: with `--cfg tokio_unstable` on Linux, exports `TaskDumpInspector`
//!   and makes it the default, so timeout messages list every alive task.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use haltwatch::{InMemoryCoordinator, InterruptCause, InterruptConfig, InterruptHandler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let coordinator = InMemoryCoordinator::new();
//!
//!     let mut cfg = InterruptConfig::default();
//!     cfg.timeout = Duration::from_secs(60);
//!     cfg.poll_interval = Duration::from_millis(10);
//!
//!     let handler = InterruptHandler::builder(cfg)
//!         .with_coordinator(Arc::new(coordinator.clone()))
//!         .build();
//!
//!     let status = handler.status();
//!     coordinator.abort("default"); // a sibling worker gave up
//!     status.notifier.closed().await;
//!
//!     assert_eq!(handler.status().cause, InterruptCause::AbortByOtherProcess);
//!     assert_eq!(
//!         handler.interrupt_message_with_stack_traces(),
//!         "Interrupted by Other Worker Process\n\n"
//!     );
//!     handler.stop().await;
//! }
//! ```
mod config;
mod coordinator;
mod core;
mod error;
mod events;
mod policies;
mod stack;
mod subscribers;

// ---- Public re-exports ----

pub use config::{InterruptConfig, RENOTIFY_DIVISOR};
pub use coordinator::{Coordinator, CoordinatorServer, InMemoryCoordinator, TcpCoordinator};
pub use crate::core::message::STACK_MARKER;
pub use crate::core::{
    InterruptCause, InterruptHandler, InterruptHandlerBuilder, InterruptStatus, Notifier,
};
pub use error::{CoordinatorError, StackError};
pub use events::{Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use stack::{BacktraceInspector, StackInspector};
pub use subscribers::Subscribe;

#[cfg(all(feature = "taskdump", tokio_unstable, target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
pub use stack::TaskDumpInspector;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
