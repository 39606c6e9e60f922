//! # Driving Ports (Inbound API)
//!
//! The registration surface hosts (and handlers registering follow-up
//! elements) program against.

use crate::domain::{ElementId, Interactable};
use std::sync::Arc;

/// Registration API over the set of active elements.
pub trait ElementDirectory: Send + Sync {
    /// Make `element` eligible for dispatch. Appends; no de-duplication.
    fn register(&self, element: Arc<dyn Interactable>) -> ElementId;

    /// Evict `id` outside the dispatcher and reaper.
    ///
    /// A scan that already took its snapshot may still offer a notification
    /// to the evicted element. Prefer returning `Outcome::Remove` from a
    /// handler or letting the element expire.
    #[deprecated(note = "races with in-flight scans; return Outcome::Remove or let the element expire")]
    fn force_remove(&self, id: &ElementId) -> bool;

    /// Read-only snapshot of active elements in insertion order.
    fn list_active(&self) -> Vec<Arc<dyn Interactable>>;
}
