//! Error types used by the haltwatch watchers and collaborators.
//!
//! This module defines two error enums:
//!
//! - [`CoordinatorError`]: failures talking to the coordination service.
//! - [`StackError`]: failures capturing stack traces for diagnostic messages.
//!
//! Neither ever reaches a caller of [`InterruptHandler`](crate::InterruptHandler):
//! coordinator errors are swallowed by the remote abort watcher (and reported as
//! events), stack errors become a placeholder in the composed message.
//! Both types provide helper methods (`as_label`, `as_message`) for logs.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by a [`Coordinator`](crate::Coordinator).
///
/// These represent failures to reach or understand the coordination service.
/// The remote abort watcher treats all of them as "no abort observed yet".
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CoordinatorError {
    /// The configured address could not be parsed or resolved.
    #[error("invalid coordinator address {address:?}: {reason}")]
    InvalidAddress {
        /// The address as configured.
        address: String,
        /// Resolver error message.
        reason: String,
    },

    /// A connection to the coordination service could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// The address that was dialed.
        address: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An established connection failed mid-request.
    #[error("coordinator i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with something that is not part of the protocol.
    #[error("coordinator protocol error: {reply}")]
    Protocol {
        /// The offending reply line.
        reply: String,
    },

    /// A request did not complete within its time bound.
    #[error("coordinator request timed out after {timeout:?}")]
    Timeout {
        /// The configured request bound.
        timeout: Duration,
    },
}

impl CoordinatorError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use haltwatch::CoordinatorError;
    /// use std::time::Duration;
    ///
    /// let err = CoordinatorError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "coordinator_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            CoordinatorError::InvalidAddress { .. } => "coordinator_invalid_address",
            CoordinatorError::Connect { .. } => "coordinator_connect",
            CoordinatorError::Io(_) => "coordinator_io",
            CoordinatorError::Protocol { .. } => "coordinator_protocol",
            CoordinatorError::Timeout { .. } => "coordinator_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CoordinatorError::InvalidAddress { address, reason } => {
                format!("invalid address {address:?}: {reason}")
            }
            CoordinatorError::Connect { address, source } => {
                format!("connect {address}: {source}")
            }
            CoordinatorError::Io(e) => format!("io: {e}"),
            CoordinatorError::Protocol { reply } => format!("unexpected reply: {reply:?}"),
            CoordinatorError::Timeout { timeout } => format!("timeout: {timeout:?}"),
        }
    }
}

/// # Errors produced while capturing stack traces.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StackError {
    /// The platform cannot produce backtraces.
    #[error("backtraces are not supported on this platform")]
    Unsupported,

    /// Backtrace capture is disabled for this process.
    #[error("backtrace capture is disabled")]
    Disabled,

    /// A custom inspector failed.
    #[error("stack capture failed: {reason}")]
    Failed {
        /// Inspector-provided reason.
        reason: String,
    },
}

impl StackError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            StackError::Unsupported => "stack_unsupported",
            StackError::Disabled => "stack_disabled",
            StackError::Failed { .. } => "stack_failed",
        }
    }
}
