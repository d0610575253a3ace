//! Process-wide "sync in progress" flag.

use std::sync::atomic::{AtomicBool, Ordering};

/// Mutual exclusion for sync invocations.
///
/// Acquisition is a single compare-and-swap, so two triggers can never both
/// observe "idle" and start concurrently. Release happens when the returned
/// [`SyncPermit`] is dropped, which covers early returns and panics alike.
#[derive(Debug, Default)]
pub struct SyncGuard {
    in_progress: AtomicBool,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard if nobody holds it.
    pub fn try_acquire(&self) -> Option<SyncPermit<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncPermit { guard: self })
    }

    pub fn is_held(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }
}

/// Proof of holding the [`SyncGuard`]; releases it on drop.
#[must_use = "the guard is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct SyncPermit<'a> {
    guard: &'a SyncGuard,
}

impl Drop for SyncPermit<'_> {
    fn drop(&mut self) {
        self.guard.in_progress.store(false, Ordering::Release);
    }
}
