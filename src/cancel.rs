//! Cooperative cancellation checked between decomposition levels.

use core::sync::atomic::{AtomicBool, Ordering};

/// A source of cancellation requests.
///
/// Transforms poll this before each level; a level that has started always
/// runs to completion.
pub trait Cancel {
    fn is_cancelled(&self) -> bool;
}

/// Never requests cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancel for NeverCancel {
    #[inline]
    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Cancel for AtomicBool {
    #[inline]
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<C: Cancel + ?Sized> Cancel for &C {
    #[inline]
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}
