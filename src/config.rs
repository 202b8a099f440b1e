//! # Interrupt handler configuration.
//!
//! Provides [`InterruptConfig`] centralized settings for one
//! [`InterruptHandler`](crate::InterruptHandler).
//!
//! ## Sentinel values
//! - `timeout = 0s` → no watchdog
//! - `coordinator_address = ""` → no remote abort watcher (unless a coordinator is injected)
//! - `bus_capacity = 0` → clamped to 1
//!
//! ## Example
//! ```
//! use std::time::Duration;
//! use haltwatch::InterruptConfig;
//!
//! let mut cfg = InterruptConfig::default();
//! cfg.timeout = Duration::from_secs(30);
//! cfg.coordinator_address = "127.0.0.1:7070".into();
//!
//! assert_eq!(cfg.watchdog_timeout(), Some(Duration::from_secs(30)));
//! assert_eq!(cfg.renotify_interval(), Some(Duration::from_secs(3)));
//! assert_eq!(cfg.coordinator_address(), Some("127.0.0.1:7070"));
//! ```

use std::time::Duration;

use crate::policies::{BackoffPolicy, JitterPolicy};

/// Re-notification ticks happen every `timeout / RENOTIFY_DIVISOR` after the first interrupt.
pub const RENOTIFY_DIVISOR: u32 = 10;

/// Configuration for an interrupt handler.
///
/// Defines:
/// - **Sources**: watchdog timeout, coordinator address, OS signals
/// - **Remote polling**: group scope, poll interval, request bound, failure backoff
/// - **Messages**: label used for the peer-abort header
/// - **Event system**: bus capacity for event delivery
///
/// ## Notes
/// All fields are public. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`, `""`) across the codebase.
#[derive(Clone, Debug)]
pub struct InterruptConfig {
    /// Watchdog timeout.
    ///
    /// - `Duration::ZERO` = no watchdog
    /// - `> 0` = interrupt after `timeout`, then re-notify every `timeout / 10`
    pub timeout: Duration,

    /// Address (`host:port`) of the coordination service.
    ///
    /// Empty disables the remote abort watcher. A malformed or unreachable
    /// address never fails construction; the watcher simply never fires.
    pub coordinator_address: String,

    /// Abort scope inside the coordination service (the worker's process group).
    pub group: String,

    /// Delay between two successful abort polls.
    pub poll_interval: Duration,

    /// Upper bound for a single coordinator request.
    pub request_timeout: Duration,

    /// Delay policy applied after failed polls (attempt = failures in a row - 1).
    pub backoff: BackoffPolicy,

    /// Label rendered into the remote-abort header: `Interrupted by Other <label> Process`.
    pub peer_label: String,

    /// Listen for SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows) as an interrupt source.
    pub os_signals: bool,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,
}

impl InterruptConfig {
    /// Returns the watchdog timeout as an `Option`.
    ///
    /// - `None` → no watchdog
    /// - `Some(d)` → first interrupt after `d`
    #[inline]
    pub fn watchdog_timeout(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }

    /// Returns the re-notification period (`timeout / 10`, at least 1ms).
    #[inline]
    pub fn renotify_interval(&self) -> Option<Duration> {
        self.watchdog_timeout()
            .map(|t| (t / RENOTIFY_DIVISOR).max(Duration::from_millis(1)))
    }

    /// Returns the trimmed coordinator address, or `None` when unset.
    #[inline]
    pub fn coordinator_address(&self) -> Option<&str> {
        let addr = self.coordinator_address.trim();
        if addr.is_empty() { None } else { Some(addr) }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for InterruptConfig {
    /// Default configuration:
    ///
    /// - `timeout = 0s` (no watchdog)
    /// - `coordinator_address = ""` (no remote watcher)
    /// - `group = "default"`
    /// - `poll_interval = 500ms`, `request_timeout = 1s`
    /// - `backoff`: first=500ms, factor=2, max=5s, equal jitter
    /// - `peer_label = "Worker"`
    /// - `os_signals = false`
    /// - `bus_capacity = 256`
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            coordinator_address: String::new(),
            group: "default".to_string(),
            poll_interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(1),
            backoff: BackoffPolicy {
                first: Duration::from_millis(500),
                max: Duration::from_secs(5),
                factor: 2.0,
                jitter: JitterPolicy::Equal,
            },
            peer_label: "Worker".to_string(),
            os_signals: false,
            bus_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_disable_all_sources() {
        let cfg = InterruptConfig::default();
        assert_eq!(cfg.watchdog_timeout(), None);
        assert_eq!(cfg.renotify_interval(), None);
        assert_eq!(cfg.coordinator_address(), None);
        assert!(!cfg.os_signals);
    }

    #[test]
    fn test_renotify_interval_is_a_tenth() {
        let cfg = InterruptConfig {
            timeout: Duration::from_millis(500),
            ..Default::default()
        };
        assert_eq!(cfg.renotify_interval(), Some(Duration::from_millis(50)));
    }

    #[test]
    fn test_renotify_interval_has_floor() {
        let cfg = InterruptConfig {
            timeout: Duration::from_micros(5),
            ..Default::default()
        };
        assert_eq!(cfg.renotify_interval(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_blank_address_is_unset() {
        let cfg = InterruptConfig {
            coordinator_address: "   ".into(),
            bus_capacity: 0,
            ..Default::default()
        };
        assert_eq!(cfg.coordinator_address(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
