//! Interrupt core: state, watchers and the handler that ties them together.
//!
//! The public API from this module is [`InterruptHandler`] (plus its builder),
//! the [`InterruptStatus`] snapshot with its [`Notifier`], and [`InterruptCause`].
//!
//! Internal modules:
//! - [`state`]: the lock-guarded `{interrupted, cause, notifier}` record;
//! - [`watchdog`]: timeout source with `T/10` re-notification;
//! - [`remote`]: coordination-service poller for peer aborts;
//! - [`signals`]: opt-in OS signal source;
//! - [`message`]: diagnostic message composition.

mod builder;
mod cause;
mod handler;
pub(crate) mod message;
mod notifier;
mod remote;
mod signals;
mod state;
mod watchdog;

pub use builder::InterruptHandlerBuilder;
pub use cause::InterruptCause;
pub use handler::InterruptHandler;
pub use notifier::Notifier;
pub use state::InterruptStatus;
