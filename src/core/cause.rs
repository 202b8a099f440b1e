use std::fmt;

/// Why an interrupt fired.
///
/// Write-once per handler: the first watcher to assign a non-`None` cause wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterruptCause {
    /// Not interrupted.
    #[default]
    None,
    /// The watchdog timeout elapsed.
    Timeout,
    /// A sibling process posted an abort to the coordination service.
    AbortByOtherProcess,
    /// The process received SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows).
    Signal,
}

impl InterruptCause {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            InterruptCause::None => "none",
            InterruptCause::Timeout => "timeout",
            InterruptCause::AbortByOtherProcess => "abort_by_other_process",
            InterruptCause::Signal => "signal",
        }
    }

    /// Returns `true` for every variant except [`InterruptCause::None`].
    #[inline]
    pub fn is_interrupt(&self) -> bool {
        !matches!(self, InterruptCause::None)
    }

    /// Returns `true` if this cause warrants a local stack capture.
    ///
    /// A peer abort is a fault in another process; this process's stacks say nothing about it.
    #[inline]
    pub fn wants_stacks(&self) -> bool {
        matches!(self, InterruptCause::Timeout | InterruptCause::Signal)
    }
}

impl fmt::Display for InterruptCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
