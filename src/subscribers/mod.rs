//! # Event subscribers.
//!
//! Extension point for observing a handler's interrupt events (logging,
//! metrics, test recorders).
//!
//! ## Architecture
//! ```text
//! watcher ── publish(Event) ──► Bus ──► handler listener ──► SubscriberSet::emit(&Event)
//!                                                         ┌─────────┼─────────┐
//!                                                         ▼         ▼         ▼
//!                                                      [queue 1] [queue 2] [queue N]
//!                                                         │         │         │
//!                                                      worker 1  worker 2  worker N
//!                                                         ▼         ▼         ▼
//!                                                   sub.on_event(&Event) (per subscriber)
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
