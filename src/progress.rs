//! Cooperative cancellation for long-running solves.
//!
//! The null-pointer solver runs a fixpoint iteration whose length depends on
//! the method under analysis. Drivers that analyse whole programs need a way
//! to abort a solve without tearing down the thread, so the solver polls a
//! caller-supplied [`ProgressMonitor`] between worklist steps and fails with
//! [`Error::Cancelled`](crate::Error::Cancelled) when cancellation is
//! signalled.

use std::sync::atomic::{AtomicBool, Ordering};

/// Observer for solver progress with a cancellation hook.
///
/// Implementations are queried between worklist iterations; they must be
/// cheap to call. The default [`worked`](Self::worked) implementation
/// ignores progress ticks, so monitors that only care about cancellation
/// implement a single method.
pub trait ProgressMonitor {
    /// Returns `true` if the analysis should stop at the next opportunity.
    fn is_cancelled(&self) -> bool;

    /// Reports that `units` worklist steps have completed.
    fn worked(&self, units: usize) {
        let _ = units;
    }
}

/// A monitor that never cancels.
///
/// The natural choice for batch runs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl ProgressMonitor for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A monitor backed by an atomic flag, settable from another thread.
///
/// # Examples
///
/// ```rust
/// use whittle::progress::{CancelFlag, ProgressMonitor};
///
/// let flag = CancelFlag::new();
/// assert!(!flag.is_cancelled());
/// flag.cancel();
/// assert!(flag.is_cancelled());
/// ```
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
}

impl CancelFlag {
    /// Creates a new, un-cancelled flag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Requests cancellation. The solver honours the request at its next
    /// worklist step.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

impl ProgressMonitor for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_cancel_is_never_cancelled() {
        let monitor = NeverCancel;
        assert!(!monitor.is_cancelled());
        monitor.worked(10);
        assert!(!monitor.is_cancelled());
    }

    #[test]
    fn cancel_flag_flips_once() {
        let flag = CancelFlag::new();
        assert!(!flag.is_cancelled());
        flag.cancel();
        flag.cancel();
        assert!(flag.is_cancelled());
    }
}
