//! # Events emitted by an interrupt handler and its watchers.
//!
//! The [`EventKind`] enum classifies events across three categories:
//! - **Watcher lifecycle**: started, stopped, failed
//! - **Interrupt flow**: raised, ignored (lost the first-cause race), re-notified
//! - **Plumbing**: coordinator health, subscriber overflow/panic, handler stopped
//!
//! The [`Event`] struct carries optional metadata such as the watcher name,
//! the cause, the re-notification tick and a human-readable reason.
//!
//! ## Example
//! ```rust
//! use haltwatch::{Event, EventKind, InterruptCause};
//!
//! let ev = Event::new(EventKind::InterruptRaised)
//!     .with_source("watchdog")
//!     .with_cause(InterruptCause::Timeout);
//!
//! assert_eq!(ev.kind, EventKind::InterruptRaised);
//! assert_eq!(ev.source.as_deref(), Some("watchdog"));
//! assert_eq!(ev.cause, Some(InterruptCause::Timeout));
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::InterruptCause;

/// Classification of interrupt events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Watcher lifecycle ===
    /// A watcher task started.
    ///
    /// Sets:
    /// - `source`: watcher name
    /// - `timeout_ms`: watchdog timeout (watchdog only)
    WatcherStarted,

    /// A watcher task exited (cancelled or done).
    ///
    /// Sets:
    /// - `source`: watcher name
    WatcherStopped,

    /// A watcher could not run at all (e.g. signal registration failed).
    ///
    /// Sets:
    /// - `source`: watcher name
    /// - `reason`: failure message
    WatcherFailed,

    // === Interrupt flow ===
    /// A watcher assigned the cause and flipped the handler to interrupted.
    ///
    /// Sets:
    /// - `source`: watcher name
    /// - `cause`: the assigned cause
    InterruptRaised,

    /// A watcher fired but another cause had already won.
    ///
    /// Sets:
    /// - `source`: watcher name
    /// - `cause`: the cause the watcher tried to assign
    /// - `reason`: the cause already in place
    InterruptIgnored,

    /// The current notifier was closed and replaced while still interrupted.
    ///
    /// Sets:
    /// - `source`: watcher name
    /// - `cause`: current cause
    /// - `tick`: re-notification count (1-based)
    Renotified,

    // === Coordinator health ===
    /// The coordination service failed to answer a poll (first of a streak).
    ///
    /// Sets:
    /// - `source`: coordinator name
    /// - `attempt`: failures in a row
    /// - `reason`: error message
    CoordinatorUnavailable,

    /// The coordination service answered again after a failure streak.
    ///
    /// Sets:
    /// - `source`: coordinator name
    /// - `attempt`: length of the streak
    CoordinatorRecovered,

    // === Handler ===
    /// `stop()` finished joining all watchers.
    HandlerStopped,

    // === Subscriber events ===
    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `source`: subscriber name
    /// - `reason`: panic message
    SubscriberPanicked,
}

/// Interrupt event with optional metadata.
///
/// - `seq`: monotonic per-bus sequence (stamped on publish)
/// - `at`: wall-clock timestamp
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Per-bus, monotonically increasing sequence number (0 until published).
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Watcher, coordinator or subscriber name.
    pub source: Option<Arc<str>>,
    /// Interrupt cause, if relevant.
    pub cause: Option<InterruptCause>,
    /// Re-notification tick (1-based).
    pub tick: Option<u64>,
    /// Consecutive failure count.
    pub attempt: Option<u32>,
    /// Watchdog timeout in milliseconds (compact).
    pub timeout_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: 0,
            at: SystemTime::now(),
            kind,
            source: None,
            cause: None,
            tick: None,
            attempt: None,
            timeout_ms: None,
            reason: None,
        }
    }

    /// Attaches the emitting watcher/subscriber name.
    #[inline]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attaches an interrupt cause.
    #[inline]
    pub fn with_cause(mut self, cause: InterruptCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attaches a re-notification tick.
    #[inline]
    pub fn with_tick(mut self, tick: u64) -> Self {
        self.tick = Some(tick);
        self
    }

    /// Attaches a failure count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a timeout duration (stored as milliseconds).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.timeout_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_source(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_source(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
