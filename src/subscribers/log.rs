//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for demos or when debugging a hung run.
//!
//! ## Example output
//! ```text
//! [watcher-started] source="watchdog" timeout_ms=Some(30000)
//! [interrupt] source="watchdog" cause=timeout
//! [renotified] source="watchdog" tick=1
//! [coordinator-unavailable] source="tcp" failures=1 err="connect 127.0.0.1:1: connection refused"
//! [handler-stopped]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let source = e.source.as_deref().unwrap_or("-");
        let cause = e.cause.map(|c| c.as_label()).unwrap_or("-");
        match e.kind {
            EventKind::WatcherStarted => {
                println!("[watcher-started] source={source:?} timeout_ms={:?}", e.timeout_ms);
            }
            EventKind::WatcherStopped => println!("[watcher-stopped] source={source:?}"),
            EventKind::WatcherFailed => {
                println!("[watcher-failed] source={source:?} err={:?}", e.reason);
            }
            EventKind::InterruptRaised => {
                println!("[interrupt] source={source:?} cause={cause}");
            }
            EventKind::InterruptIgnored => {
                println!(
                    "[interrupt-ignored] source={source:?} cause={cause} existing={:?}",
                    e.reason
                );
            }
            EventKind::Renotified => {
                println!("[renotified] source={source:?} tick={}", e.tick.unwrap_or(0));
            }
            EventKind::CoordinatorUnavailable => {
                println!(
                    "[coordinator-unavailable] source={source:?} failures={} err={:?}",
                    e.attempt.unwrap_or(0),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
            EventKind::CoordinatorRecovered => {
                println!(
                    "[coordinator-recovered] source={source:?} after_failures={}",
                    e.attempt.unwrap_or(0)
                );
            }
            EventKind::HandlerStopped => println!("[handler-stopped]"),
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={source:?} reason={:?}", e.reason);
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={source} info={}",
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
