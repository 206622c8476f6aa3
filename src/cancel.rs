//! Cooperative cancellation.
//!
//! The kernel polls a [`CancelSignal`] once before every row. A host that
//! wants to abort a render flips the signal from another thread; the kernel
//! notices at the next row boundary and returns early, leaving the rows it
//! has not reached untouched.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Source of a cancellation request, shared by all render workers.
pub trait CancelSignal: Sync {
    /// Returns `true` once the current render should stop.
    fn is_cancelled(&self) -> bool;
}

/// Signal that never fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl CancelSignal for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: CancelSignal + ?Sized> CancelSignal for &T {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

impl<T: CancelSignal + Send + ?Sized> CancelSignal for Arc<T> {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_cancel() {
        assert!(!NeverCancel.is_cancelled());
    }

    #[test]
    fn test_atomic_bool_shared() {
        let flag = Arc::new(AtomicBool::new(false));
        let signal = Arc::clone(&flag);
        assert!(!signal.is_cancelled());

        flag.store(true, Ordering::Relaxed);
        assert!(signal.is_cancelled());
        assert!((&*flag).is_cancelled());
    }
}
