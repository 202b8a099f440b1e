//! # Diagnostic message composition.
//!
//! Builds the text returned by
//! [`InterruptHandler::interrupt_message_with_stack_traces`](crate::InterruptHandler::interrupt_message_with_stack_traces).
//!
//! ## Layout
//! ```text
//! Timeout:   "Interrupted by Timeout\n\n"                  + stack section
//! Signal:    "Interrupted by User\n\n"                     + stack section
//! Abort:     "Interrupted by Other <peer_label> Process\n\n"
//! None:      "Not Interrupted\n\n"
//!
//! stack section:
//!   "Here's a stack trace of all running tasks:\n"
//!   "  <capture line 1>\n"
//!   "  <capture line 2>\n" ...
//! ```
//!
//! A failed capture keeps the marker and renders
//! `  <stack capture unavailable: reason>` instead of the lines.

use std::fmt::Write as _;

use super::cause::InterruptCause;
use crate::stack::StackInspector;

/// Marker line introducing the stack section.
pub const STACK_MARKER: &str = "Here's a stack trace of all running tasks:";

/// Returns the header line (without the blank line) for `cause`.
pub fn header(cause: InterruptCause, peer_label: &str) -> String {
    match cause {
        InterruptCause::Timeout => "Interrupted by Timeout".to_string(),
        InterruptCause::Signal => "Interrupted by User".to_string(),
        InterruptCause::AbortByOtherProcess => format!("Interrupted by Other {peer_label} Process"),
        InterruptCause::None => "Not Interrupted".to_string(),
    }
}

/// Composes the full diagnostic message for `cause`.
///
/// Calls `inspector` only for causes that want stacks; never mutates any state.
pub fn compose(cause: InterruptCause, peer_label: &str, inspector: &dyn StackInspector) -> String {
    let mut out = header(cause, peer_label);
    out.push_str("\n\n");
    if !cause.wants_stacks() {
        return out;
    }

    out.push_str(STACK_MARKER);
    out.push('\n');
    match inspector.capture_all() {
        Ok(capture) => {
            for line in capture.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        Err(e) => {
            let _ = writeln!(out, "  <stack capture unavailable: {e}>");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackError;

    struct Fixed(&'static str);

    impl StackInspector for Fixed {
        fn capture_all(&self) -> Result<String, StackError> {
            Ok(self.0.to_string())
        }
    }

    struct Broken;

    impl StackInspector for Broken {
        fn capture_all(&self) -> Result<String, StackError> {
            Err(StackError::Unsupported)
        }
    }

    struct MustNotCapture;

    impl StackInspector for MustNotCapture {
        fn capture_all(&self) -> Result<String, StackError> {
            panic!("stack capture requested for a cause without stacks");
        }
    }

    #[test]
    fn test_timeout_includes_indented_stacks() {
        let msg = compose(InterruptCause::Timeout, "Worker", &Fixed("task 1:\n  at spec.rs:10"));
        assert_eq!(
            msg,
            "Interrupted by Timeout\n\n\
             Here's a stack trace of all running tasks:\n  \
             task 1:\n    at spec.rs:10\n"
        );
    }

    #[test]
    fn test_abort_has_no_stacks() {
        let msg = compose(InterruptCause::AbortByOtherProcess, "Ginkgo", &MustNotCapture);
        assert_eq!(msg, "Interrupted by Other Ginkgo Process\n\n");
        assert!(!msg.contains("Here's a stack trace"));
    }

    #[test]
    fn test_signal_includes_stacks() {
        let msg = compose(InterruptCause::Signal, "Worker", &Fixed("main"));
        assert!(msg.starts_with("Interrupted by User\n\n"));
        assert!(msg.contains("Here's a stack trace"));
    }

    #[test]
    fn test_capture_failure_degrades_to_placeholder() {
        let msg = compose(InterruptCause::Timeout, "Worker", &Broken);
        assert!(msg.starts_with("Interrupted by Timeout\n\n"));
        assert!(msg.contains(STACK_MARKER));
        assert!(msg.ends_with("  <stack capture unavailable: backtraces are not supported on this platform>\n"));
    }

    #[test]
    fn test_not_interrupted() {
        assert_eq!(
            compose(InterruptCause::None, "Worker", &MustNotCapture),
            "Not Interrupted\n\n"
        );
    }
}
