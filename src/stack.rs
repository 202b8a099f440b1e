//! # Stack capture for diagnostic messages.
//!
//! [`StackInspector`] is the seam through which the message composer asks the
//! runtime "what is everybody doing right now". The default
//! [`BacktraceInspector`] reports the Tokio runtime's shape (workers, alive
//! tasks) followed by a forced backtrace of the calling thread. Engines that
//! track their own per-test stacks plug in a richer implementation through
//! [`InterruptHandlerBuilder::with_inspector`](crate::InterruptHandlerBuilder::with_inspector).
//!
//! With the `taskdump` feature, built with `--cfg tokio_unstable` on Linux, the
//! default becomes `TaskDumpInspector`, which dumps a backtrace of every task
//! alive on the runtime.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::Write as _;

use crate::error::StackError;

/// Captures the call stacks of everything currently running in this process.
pub trait StackInspector: Send + Sync + 'static {
    /// Returns a textual capture of all running tasks.
    ///
    /// Called synchronously from
    /// [`InterruptHandler::interrupt_message_with_stack_traces`](crate::InterruptHandler::interrupt_message_with_stack_traces);
    /// must not block on the async runtime.
    fn capture_all(&self) -> Result<String, StackError>;
}

/// Default inspector built on [`std::backtrace`] and Tokio runtime metrics.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceInspector;

impl BacktraceInspector {
    /// Construct a new [`BacktraceInspector`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl StackInspector for BacktraceInspector {
    fn capture_all(&self) -> Result<String, StackError> {
        let bt = Backtrace::force_capture();
        match bt.status() {
            BacktraceStatus::Captured => {}
            BacktraceStatus::Disabled => return Err(StackError::Disabled),
            _ => return Err(StackError::Unsupported),
        }

        let mut out = String::new();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let metrics = handle.metrics();
            let _ = writeln!(
                out,
                "tokio runtime: {} worker(s), {} alive task(s)",
                metrics.num_workers(),
                metrics.num_alive_tasks(),
            );
        }
        let current = std::thread::current();
        let _ = writeln!(
            out,
            "thread '{}' ({:?}):",
            current.name().unwrap_or("<unnamed>"),
            current.id()
        );
        let _ = write!(out, "{bt}");
        Ok(out)
    }
}

#[cfg(all(feature = "taskdump", tokio_unstable, target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
pub use taskdump::TaskDumpInspector;

#[cfg(all(feature = "taskdump", tokio_unstable, target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
mod taskdump {
    use std::fmt::Write as _;
    use std::time::Duration;

    use tokio::runtime::{Handle, RuntimeFlavor};

    use super::{BacktraceInspector, StackInspector};
    use crate::error::StackError;

    /// Inspector built on Tokio task dumps: one backtrace per task alive on the runtime.
    ///
    /// Falls back to [`BacktraceInspector`] when the dump cannot be taken, e.g. on a
    /// current-thread runtime where the caller would block the only worker.
    #[derive(Debug, Clone, Copy)]
    pub struct TaskDumpInspector {
        timeout: Duration,
    }

    impl TaskDumpInspector {
        /// Construct an inspector that gives up on a dump after `timeout`.
        #[must_use]
        pub fn new(timeout: Duration) -> Self {
            Self { timeout }
        }

        pub(crate) fn dump(&self) -> Result<String, StackError> {
            let handle = Handle::try_current().map_err(|e| StackError::Failed {
                reason: e.to_string(),
            })?;
            if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
                return Err(StackError::Unsupported);
            }

            let dump = tokio::task::block_in_place(|| {
                handle.block_on(tokio::time::timeout(self.timeout, handle.dump()))
            })
            .map_err(|_| StackError::Failed {
                reason: format!("task dump timed out after {:?}", self.timeout),
            })?;

            let mut out = String::new();
            for task in dump.tasks().iter() {
                let _ = writeln!(out, "task {}:", task.id());
                let _ = writeln!(out, "{}", task.trace());
            }
            Ok(out)
        }
    }

    impl Default for TaskDumpInspector {
        fn default() -> Self {
            Self::new(Duration::from_secs(1))
        }
    }

    impl StackInspector for TaskDumpInspector {
        fn capture_all(&self) -> Result<String, StackError> {
            self.dump().or_else(|_| BacktraceInspector.capture_all())
        }
    }

}

/// Inspector used when the builder is given none.
pub(crate) fn default_inspector() -> std::sync::Arc<dyn StackInspector> {
    #[cfg(all(feature = "taskdump", tokio_unstable, target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        std::sync::Arc::new(TaskDumpInspector::default())
    }
    #[cfg(not(all(feature = "taskdump", tokio_unstable, target_os = "linux", any(target_arch = "x86_64", target_arch = "aarch64"))))]
    {
        std::sync::Arc::new(BacktraceInspector::new())
    }
}
