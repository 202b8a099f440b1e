//! # Coordination service: cross-process abort broadcasts.
//!
//! Sibling workers of one test run share a coordination service. Any worker can
//! [`post_abort`](Coordinator::post_abort) for its process group; every other
//! worker's remote abort watcher eventually observes
//! [`is_aborted`](Coordinator::is_aborted) `== true` and interrupts.
//!
//! ## Implementations
//! - [`InMemoryCoordinator`]: single-process store; test double and server backing
//! - [`TcpCoordinator`]: client speaking the line protocol to a [`CoordinatorServer`]
//! - [`CoordinatorServer`]: tiny TCP service hosting an [`InMemoryCoordinator`]
//!
//! ## Wire protocol
//! One request per connection, newline-terminated:
//! ```text
//! STATUS <group>   ──►  ABORTED | RUNNING
//! ABORT <group>    ──►  OK
//! <anything else>  ──►  ERR <reason>
//! ```

mod memory;
mod protocol;
mod server;
mod tcp;

use async_trait::async_trait;

use crate::error::CoordinatorError;

pub use memory::InMemoryCoordinator;
pub use server::CoordinatorServer;
pub use tcp::TcpCoordinator;

/// Abort broadcast capability consumed by the remote abort watcher.
///
/// Delivery is at-least-once: once a sibling posts an abort for `group`,
/// every later `is_aborted(group)` answers `true`.
#[async_trait]
pub trait Coordinator: Send + Sync + 'static {
    /// Returns `true` once any process has posted an abort for `group`.
    async fn is_aborted(&self, group: &str) -> Result<bool, CoordinatorError>;

    /// Broadcasts an abort for `group` to all sibling processes.
    async fn post_abort(&self, group: &str) -> Result<(), CoordinatorError>;

    /// Returns the name used in coordinator events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
