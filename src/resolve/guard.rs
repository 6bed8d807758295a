//! Cycle detection for recursive resolution.
//!
//! A self-importing module (or a mutually-importing pair) would otherwise
//! recurse forever: resolving the import re-enters resolution of the same
//! name. The guard is a set of in-flight `name#level` markers owned by one
//! top-level resolution call and threaded by reference through every
//! recursive step — deliberately not thread-local, so concurrent
//! resolutions on other threads never share marker state.

use std::cell::RefCell;

use rustc_hash::FxHashSet;

/// Per-call set of in-flight resolution markers.
#[derive(Debug, Default)]
pub(crate) struct CycleGuard {
    in_flight: RefCell<FxHashSet<String>>,
}

impl CycleGuard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Try to enter a descent for `marker`.
    ///
    /// Returns `None` when the marker is already in flight — the caller
    /// must break the cycle by returning an empty result. On `Some`, the
    /// marker is held until the returned entry is dropped; the drop runs
    /// on every exit path, success or error.
    pub(crate) fn enter(&self, marker: String) -> Option<GuardEntry<'_>> {
        if !self.in_flight.borrow_mut().insert(marker.clone()) {
            return None;
        }
        Some(GuardEntry {
            guard: self,
            marker,
        })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.in_flight.borrow().is_empty()
    }
}

/// Scoped marker; removes itself from the guard set on drop.
pub(crate) struct GuardEntry<'a> {
    guard: &'a CycleGuard,
    marker: String,
}

impl Drop for GuardEntry<'_> {
    fn drop(&mut self) {
        self.guard.in_flight.borrow_mut().remove(&self.marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reentry_is_refused() {
        let guard = CycleGuard::new();
        let entry = guard.enter("a.b#0".to_string());
        assert!(entry.is_some());
        assert!(guard.enter("a.b#0".to_string()).is_none());
    }

    #[test]
    fn test_marker_removed_on_drop() {
        let guard = CycleGuard::new();
        {
            let _entry = guard.enter("a#1".to_string());
            assert!(!guard.is_empty());
        }
        assert!(guard.is_empty());
        assert!(guard.enter("a#1".to_string()).is_some());
    }

    #[test]
    fn test_same_name_different_level_is_distinct() {
        let guard = CycleGuard::new();
        let _zero = guard.enter("a#0".to_string());
        assert!(guard.enter("a#1".to_string()).is_some());
    }

    #[test]
    fn test_marker_removed_on_unwind() {
        let guard = CycleGuard::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _entry = guard.enter("a#0".to_string());
            panic!("descent failed");
        }));
        assert!(result.is_err());
        assert!(guard.is_empty());
    }
}
