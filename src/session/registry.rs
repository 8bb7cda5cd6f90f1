//! Registry of open document sessions
//!
//! Every check-and-mutate happens under one lock acquisition, so a response,
//! a timeout and a cancellation racing for the same pending save see a
//! single winner.

use super::state::{PendingSave, SaveReply, SaveTicket, SessionEntry, SessionInfo, SurfaceHandle};
use crate::document::DocumentId;
use crate::error::{PreviewError, PreviewResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::oneshot;
use tracing::{debug, info};

/// One entry per open render surface
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<DocumentId, SessionEntry>>,
    next_ticket: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface for a document
    ///
    /// Re-registering (setup running again, e.g. on revert) swaps the surface
    /// but keeps a pending save and the dirty flag. Returns true for a new
    /// session.
    pub fn register(&self, id: &DocumentId, surface: SurfaceHandle) -> bool {
        let mut sessions = self.sessions.lock();
        match sessions.get_mut(id) {
            Some(entry) => {
                entry.surface = surface;
                debug!(%id, "Session surface replaced");
                false
            }
            None => {
                sessions.insert(id.clone(), SessionEntry::new(id.clone(), surface));
                info!(%id, "Session registered");
                true
            }
        }
    }

    /// Look up a session
    pub fn get(&self, id: &DocumentId) -> Option<SessionInfo> {
        self.sessions.lock().get(id).map(SessionEntry::info)
    }

    /// The session whose surface currently has focus
    pub fn lookup_active(&self) -> Option<SessionInfo> {
        self.sessions
            .lock()
            .values()
            .find(|entry| entry.active)
            .map(SessionEntry::info)
    }

    /// Give focus to one session, taking it from all others
    pub fn focus(&self, id: &DocumentId) -> bool {
        let mut sessions = self.sessions.lock();
        if !sessions.contains_key(id) {
            return false;
        }
        for (key, entry) in sessions.iter_mut() {
            entry.active = key == id;
        }
        true
    }

    /// Record whether the surface holds unsaved changes
    pub fn mark_dirty(&self, id: &DocumentId, dirty: bool) -> bool {
        match self.sessions.lock().get_mut(id) {
            Some(entry) => {
                entry.dirty = dirty;
                true
            }
            None => false,
        }
    }

    /// Remove a session; a pending save sees its resolver dropped
    pub fn remove(&self, id: &DocumentId) -> bool {
        let removed = self.sessions.lock().remove(id).is_some();
        if removed {
            info!(%id, "Session removed");
        }
        removed
    }

    /// Remove all sessions
    pub fn clear(&self) {
        let mut sessions = self.sessions.lock();
        let count = sessions.len();
        sessions.clear();
        debug!(count, "Sessions cleared");
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    /// All sessions, oldest first
    pub fn list(&self) -> Vec<SessionInfo> {
        let mut sessions: Vec<SessionInfo> =
            self.sessions.lock().values().map(SessionEntry::info).collect();
        sessions.sort_by(|a, b| a.opened_at.cmp(&b.opened_at));
        sessions
    }

    /// Install a resolver for a new save request
    ///
    /// Fails if the document has no session or a save is already pending.
    pub fn begin_save(
        &self,
        id: &DocumentId,
    ) -> PreviewResult<(SaveTicket, oneshot::Receiver<SaveReply>)> {
        let mut sessions = self.sessions.lock();
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| PreviewError::NoActiveSession(id.to_string()))?;

        if entry.pending_save.is_some() {
            return Err(PreviewError::SaveInProgress(id.to_string()));
        }

        let ticket = SaveTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed));
        let (resolver, receiver) = oneshot::channel();
        entry.pending_save = Some(PendingSave { ticket, resolver });
        Ok((ticket, receiver))
    }

    /// Deliver a save response to the pending request, if any
    ///
    /// The resolver is taken and fired under the lock. Returns false when
    /// nothing was pending (late response after timeout or cancellation).
    pub fn resolve_save(&self, id: &DocumentId, reply: SaveReply) -> bool {
        let mut sessions = self.sessions.lock();
        let Some(pending) = sessions.get_mut(id).and_then(|e| e.pending_save.take()) else {
            return false;
        };
        // Receiver may already be gone if the save future was dropped
        pending.resolver.send(reply).is_ok()
    }

    /// Clear the pending save if it still belongs to `ticket`
    pub fn cancel_save(&self, id: &DocumentId, ticket: SaveTicket) -> bool {
        let mut sessions = self.sessions.lock();
        let Some(entry) = sessions.get_mut(id) else {
            return false;
        };
        match &entry.pending_save {
            Some(pending) if pending.ticket == ticket => {
                entry.pending_save = None;
                true
            }
            _ => false,
        }
    }

    pub fn has_pending_save(&self, id: &DocumentId) -> bool {
        self.sessions
            .lock()
            .get(id)
            .is_some_and(|e| e.pending_save.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingTransport;
    use std::sync::Arc;

    fn surface() -> SurfaceHandle {
        SurfaceHandle::new(Arc::new(RecordingTransport::default()))
    }

    fn id(name: &str) -> DocumentId {
        DocumentId::new(format!("file:///{name}"))
    }

    #[test]
    fn register_get_remove() {
        let registry = SessionRegistry::new();
        assert!(registry.register(&id("a.pdf"), surface()));

        let info = registry.get(&id("a.pdf")).unwrap();
        assert_eq!(info.document_id, id("a.pdf"));
        assert!(!info.save_pending);

        assert!(registry.remove(&id("a.pdf")));
        assert!(registry.get(&id("a.pdf")).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn reregister_keeps_pending_save() {
        let registry = SessionRegistry::new();
        registry.register(&id("a.pdf"), surface());
        let (_ticket, _rx) = registry.begin_save(&id("a.pdf")).unwrap();

        let replacement = surface();
        let new_surface_id = replacement.surface_id;
        assert!(!registry.register(&id("a.pdf"), replacement));

        let info = registry.get(&id("a.pdf")).unwrap();
        assert!(info.save_pending);
        assert_eq!(info.surface.surface_id, new_surface_id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn lookup_active_follows_focus() {
        let registry = SessionRegistry::new();
        registry.register(&id("a.pdf"), surface());
        registry.register(&id("b.pdf"), surface());
        assert!(registry.lookup_active().is_none());

        assert!(registry.focus(&id("a.pdf")));
        assert!(registry.focus(&id("b.pdf")));
        assert_eq!(registry.lookup_active().unwrap().document_id, id("b.pdf"));

        assert!(!registry.focus(&id("missing.pdf")));
        assert_eq!(registry.lookup_active().unwrap().document_id, id("b.pdf"));
    }

    #[test]
    fn second_save_is_rejected() {
        let registry = SessionRegistry::new();
        registry.register(&id("a.pdf"), surface());

        let (_ticket, _rx) = registry.begin_save(&id("a.pdf")).unwrap();
        let err = registry.begin_save(&id("a.pdf")).unwrap_err();
        assert!(matches!(err, PreviewError::SaveInProgress(_)));
    }

    #[test]
    fn begin_save_without_session() {
        let registry = SessionRegistry::new();
        let err = registry.begin_save(&id("a.pdf")).unwrap_err();
        assert!(matches!(err, PreviewError::NoActiveSession(_)));
    }

    #[test]
    fn resolve_delivers_reply_once() {
        let registry = SessionRegistry::new();
        registry.register(&id("a.pdf"), surface());
        let (_ticket, mut rx) = registry.begin_save(&id("a.pdf")).unwrap();

        assert!(registry.resolve_save(&id("a.pdf"), Some(vec![1, 2, 3])));
        assert!(!registry.resolve_save(&id("a.pdf"), None));

        assert_eq!(rx.try_recv().unwrap(), Some(vec![1, 2, 3]));
        assert!(!registry.has_pending_save(&id("a.pdf")));
    }

    #[test]
    fn cancel_only_matches_own_ticket() {
        let registry = SessionRegistry::new();
        registry.register(&id("a.pdf"), surface());

        let (first, _rx) = registry.begin_save(&id("a.pdf")).unwrap();
        assert!(registry.cancel_save(&id("a.pdf"), first));

        let (_second, _rx2) = registry.begin_save(&id("a.pdf")).unwrap();
        assert!(!registry.cancel_save(&id("a.pdf"), first));
        assert!(registry.has_pending_save(&id("a.pdf")));
    }

    #[test]
    fn remove_drops_resolver() {
        let registry = SessionRegistry::new();
        registry.register(&id("a.pdf"), surface());
        let (_ticket, mut rx) = registry.begin_save(&id("a.pdf")).unwrap();

        registry.remove(&id("a.pdf"));

        assert!(matches!(
            rx.try_recv(),
            Err(oneshot::error::TryRecvError::Closed)
        ));
    }
}
