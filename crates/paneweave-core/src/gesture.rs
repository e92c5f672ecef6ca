#![forbid(unsafe_code)]

//! Pointer-gesture lifecycle plumbing.
//!
//! Interactive gestures (divider resize, pane drag) install move/up/cancel
//! listeners on the host for their whole duration. A [`ListenerGuard`] owns
//! the removal of those listeners: it runs the host-supplied release hook
//! exactly once, either when the gesture finishes explicitly or when the
//! guard is dropped on any other exit path (early return, cancellation,
//! panic unwinding).
//!
//! # Invariants
//!
//! 1. The release hook runs at most once per guard.
//! 2. Dropping an unreleased guard runs the hook.
//! 3. A guard created with [`ListenerGuard::detached`] never calls anything.

use std::fmt;

use crate::logging::targets;

/// Identifier the host uses to pair listener installation with removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GestureId(u64);

impl GestureId {
    /// Wrap a raw host identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GestureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gesture#{}", self.0)
    }
}

/// Why a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureEnd {
    /// Pointer released normally; the gesture result was committed.
    Committed,
    /// Escape, focus loss, or an explicit cancel.
    Canceled,
    /// The guard was dropped without an explicit end.
    Abandoned,
}

type ReleaseHook = Box<dyn FnOnce(GestureId, GestureEnd)>;

/// RAII owner of a gesture's host listeners.
pub struct ListenerGuard {
    id: GestureId,
    release: Option<ReleaseHook>,
}

impl ListenerGuard {
    /// Create a guard that calls `release` when the gesture ends.
    pub fn new(id: GestureId, release: impl FnOnce(GestureId, GestureEnd) + 'static) -> Self {
        tracing::trace!(target: targets::GESTURE, gesture = id.get(), "listeners installed");
        Self {
            id,
            release: Some(Box::new(release)),
        }
    }

    /// A guard with no host listeners attached (headless drivers and tests).
    #[must_use]
    pub const fn detached(id: GestureId) -> Self {
        Self { id, release: None }
    }

    /// Gesture identifier.
    #[must_use]
    pub const fn id(&self) -> GestureId {
        self.id
    }

    /// Whether the release hook is still pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.release.is_some()
    }

    /// End the gesture and remove its listeners now.
    pub fn finish(mut self, end: GestureEnd) {
        self.run_release(end);
    }

    fn run_release(&mut self, end: GestureEnd) {
        if let Some(release) = self.release.take() {
            tracing::trace!(
                target: targets::GESTURE,
                gesture = self.id.get(),
                end = ?end,
                "listeners removed"
            );
            release(self.id, end);
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.run_release(GestureEnd::Abandoned);
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("id", &self.id)
            .field("armed", &self.is_armed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_guard(id: u64) -> (ListenerGuard, Rc<RefCell<Vec<(GestureId, GestureEnd)>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let guard = ListenerGuard::new(GestureId::new(id), move |gesture, end| {
            sink.borrow_mut().push((gesture, end));
        });
        (guard, log)
    }

    #[test]
    fn finish_releases_once() {
        let (guard, log) = recording_guard(7);
        assert!(guard.is_armed());
        guard.finish(GestureEnd::Committed);
        assert_eq!(
            log.borrow().as_slice(),
            &[(GestureId::new(7), GestureEnd::Committed)]
        );
    }

    #[test]
    fn drop_releases_as_abandoned() {
        let (guard, log) = recording_guard(3);
        drop(guard);
        assert_eq!(
            log.borrow().as_slice(),
            &[(GestureId::new(3), GestureEnd::Abandoned)]
        );
    }

    #[test]
    fn early_return_path_still_releases() {
        let (guard, log) = recording_guard(9);
        let run = |guard: ListenerGuard, bail: bool| -> Option<()> {
            let _guard = guard;
            if bail {
                return None;
            }
            Some(())
        };
        assert!(run(guard, true).is_none());
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn detached_guard_is_inert() {
        let guard = ListenerGuard::detached(GestureId::new(1));
        assert!(!guard.is_armed());
        guard.finish(GestureEnd::Canceled);
    }
}
