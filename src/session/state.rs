//! Per-document session state

use crate::document::DocumentId;
use crate::error::PreviewResult;
use crate::transport::{HostMessage, SurfaceTransport};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use uuid::Uuid;

/// Payload delivered to a pending save: `None` when the surface had nothing
/// to persist
pub type SaveReply = Option<Vec<u8>>;

/// Handle to the render surface showing a document
#[derive(Clone)]
pub struct SurfaceHandle {
    /// Unique surface ID
    pub surface_id: Uuid,

    transport: Arc<dyn SurfaceTransport>,
}

impl SurfaceHandle {
    pub fn new(transport: Arc<dyn SurfaceTransport>) -> Self {
        Self {
            surface_id: Uuid::new_v4(),
            transport,
        }
    }

    /// Send a message to the surface
    pub async fn send(&self, message: HostMessage) -> PreviewResult<()> {
        self.transport.send(message).await
    }
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("surface_id", &self.surface_id)
            .finish_non_exhaustive()
    }
}

/// Identifies one save request so stale timers cannot clear a newer one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveTicket(pub(crate) u64);

pub(crate) struct PendingSave {
    pub ticket: SaveTicket,
    pub resolver: oneshot::Sender<SaveReply>,
}

/// Registry entry for an open document
pub struct SessionEntry {
    pub document_id: DocumentId,
    pub surface: SurfaceHandle,
    pub opened_at: DateTime<Utc>,
    /// Surface currently has focus
    pub active: bool,
    /// Surface reported unsaved changes
    pub dirty: bool,
    pub(crate) pending_save: Option<PendingSave>,
}

impl SessionEntry {
    pub fn new(document_id: DocumentId, surface: SurfaceHandle) -> Self {
        Self {
            document_id,
            surface,
            opened_at: Utc::now(),
            active: false,
            dirty: false,
            pending_save: None,
        }
    }

    /// Read-only view without the resolver
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            document_id: self.document_id.clone(),
            surface: self.surface.clone(),
            opened_at: self.opened_at,
            active: self.active,
            dirty: self.dirty,
            save_pending: self.pending_save.is_some(),
        }
    }
}

/// Snapshot of a session handed out by the registry
#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub document_id: DocumentId,
    #[serde(skip)]
    pub surface: SurfaceHandle,
    pub opened_at: DateTime<Utc>,
    pub active: bool,
    pub dirty: bool,
    pub save_pending: bool,
}
