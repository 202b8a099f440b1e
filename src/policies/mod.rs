//! Retry delay policies.
//!
//! Controls **how long** the remote abort watcher waits before polling again
//! after the coordination service failed to answer.
//!
//! ## Contents
//! - [`BackoffPolicy`] how failure delays evolve (first / factor / max + jitter)
//! - [`JitterPolicy`]  randomization so sibling workers do not hammer a recovering service in lockstep
//!
//! ## Quick wiring
//! ```text
//! InterruptConfig { poll_interval, backoff: BackoffPolicy, .. }
//!      └─► core::remote::run uses:
//!           - poll_interval while the service answers
//!           - backoff.next(failures - 1) while it does not
//! ```

mod backoff;
mod jitter;

pub use backoff::BackoffPolicy;
pub use jitter::JitterPolicy;
