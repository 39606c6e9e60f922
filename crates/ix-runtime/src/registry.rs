//! # Element Registry
//!
//! Insertion-ordered set of active elements, shared by the dispatcher and
//! the reaper.
//!
//! ## Locking
//!
//! Two locks with distinct jobs:
//!
//! | Lock         | Held by                                  | Duration                 |
//! |--------------|------------------------------------------|--------------------------|
//! | `scan_lock`  | one dispatch scan or one reaper sweep    | the whole scan/sweep     |
//! | `elements`   | every read or write of the element list  | a single push/retain/clone |
//!
//! `scan_lock` serializes scans and sweeps across threads: a slow handler
//! delays the next sweep and every pending dispatch. It is reentrant, so a
//! handler or expiry callback may start a nested scan or sweep on its own
//! thread (for example `submit` through an inline pool).
//! `elements` is never held while element code runs, so handlers and
//! callbacks may register new elements without deadlocking.

use ix_core::{ElementId, Interactable};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::sync::Arc;
use tracing::debug;

/// Shared element registry.
#[derive(Default)]
pub struct ElementRegistry {
    scan_lock: ReentrantMutex<()>,
    elements: RwLock<Vec<Arc<dyn Interactable>>>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `element`. Duplicate insertion is not checked.
    pub fn add(&self, element: Arc<dyn Interactable>) -> ElementId {
        let id = element.id();
        let mut elements = self.elements.write();
        elements.push(element);
        debug!(element_id = %id, active = elements.len(), "Element registered");
        id
    }

    /// Remove `id` without entering the scan critical section.
    ///
    /// Races with in-flight scans and sweeps: a scan that already took its
    /// snapshot may still offer its notification to the removed element,
    /// and a sweep may still run its expiry callbacks. Prefer returning
    /// `Outcome::Remove` from a handler or letting the element expire.
    #[deprecated(note = "races with in-flight scans; return Outcome::Remove or let the element expire")]
    pub fn remove_unsafe(&self, id: &ElementId) -> bool {
        self.evict(id)
    }

    /// Read-only snapshot in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<dyn Interactable>> {
        self.elements.read().clone()
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.read().iter().any(|e| e.id() == *id)
    }

    /// Remove every entry with `id`. Returns whether anything was removed.
    pub(crate) fn evict(&self, id: &ElementId) -> bool {
        let mut elements = self.elements.write();
        let before = elements.len();
        elements.retain(|e| e.id() != *id);
        let removed = elements.len() != before;
        if removed {
            debug!(element_id = %id, active = elements.len(), "Element evicted");
        }
        removed
    }

    /// Remove every element matching `predicate`, returning them in
    /// insertion order.
    pub(crate) fn evict_where<F>(&self, mut predicate: F) -> Vec<Arc<dyn Interactable>>
    where
        F: FnMut(&Arc<dyn Interactable>) -> bool,
    {
        let mut elements = self.elements.write();
        let mut evicted = Vec::new();
        elements.retain(|e| {
            if predicate(e) {
                evicted.push(Arc::clone(e));
                false
            } else {
                true
            }
        });
        evicted
    }

    /// Enter the scan/sweep critical section. Re-entering on the same
    /// thread succeeds immediately.
    pub(crate) fn lock_scan(&self) -> ReentrantMutexGuard<'_, ()> {
        self.scan_lock.lock()
    }
}

impl std::fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRegistry")
            .field("active", &self.len())
            .finish()
    }
}
