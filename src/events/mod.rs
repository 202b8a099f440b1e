//! Interrupt lifecycle events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`, one per handler
//!
//! ## Quick reference
//! - **Publishers**: the watchdog, remote abort and signal watchers, the handler
//!   itself (`HandlerStopped`), and `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the handler's listener task (fans out to `SubscriberSet`) and
//!   any receiver obtained through [`InterruptHandler::events`](crate::InterruptHandler::events).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
