//! Save round trip with the render surface
//!
//! A save asks the surface to serialize its document, waits for the
//! `save-response`, then writes the bytes and refreshes the cache. The wait
//! ends on whichever comes first: the response, the timeout, or external
//! cancellation. The registry hands the resolver to exactly one of them.

use crate::cache::DocumentCache;
use crate::document::DocumentId;
use crate::error::{PreviewError, PreviewResult};
use crate::session::{SaveReply, SaveTicket, SessionRegistry, SurfaceHandle};
use crate::storage::BackingStore;
use crate::transport::HostMessage;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default wait for a save response
pub const DEFAULT_SAVE_TIMEOUT: Duration = Duration::from_secs(30);

enum Wake {
    Reply(PreviewResult<SaveReply>),
    TimedOut,
    Cancelled,
}

/// Clears the resolver if the save future is dropped while waiting
struct PendingGuard<'a> {
    registry: &'a SessionRegistry,
    id: &'a DocumentId,
    ticket: SaveTicket,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.registry.cancel_save(self.id, self.ticket);
    }
}

/// Drives save requests for every open document
pub struct SaveCoordinator {
    registry: Arc<SessionRegistry>,
    cache: Arc<DocumentCache>,
    store: Arc<dyn BackingStore>,
    timeout: Duration,
}

impl SaveCoordinator {
    pub fn new(
        registry: Arc<SessionRegistry>,
        cache: Arc<DocumentCache>,
        store: Arc<dyn BackingStore>,
    ) -> Self {
        Self {
            registry,
            cache,
            store,
            timeout: DEFAULT_SAVE_TIMEOUT,
        }
    }

    /// Override the response timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Ask `surface` for the current bytes of `id` and persist them
    ///
    /// Fails with `SaveInProgress` if a save for `id` is already waiting.
    pub async fn perform_save(
        &self,
        id: &DocumentId,
        surface: &SurfaceHandle,
        cancel: &CancellationToken,
    ) -> PreviewResult<()> {
        let (ticket, mut response) = self.registry.begin_save(id)?;
        let _pending = PendingGuard {
            registry: &self.registry,
            id,
            ticket,
        };
        let started = Instant::now();
        info!(%id, "Initiating save");

        // The request itself is inside the timed section: a stalled
        // transport is bounded by the same timeout and cancellation
        let exchange = async {
            surface
                .send(HostMessage::Save)
                .await
                .inspect_err(|e| warn!(%id, error = %e, "Failed to send save request"))?;
            debug!(%id, "Save request sent, awaiting response");
            (&mut response)
                .await
                .map_err(|_| PreviewError::SurfaceClosed(id.to_string()))
        };

        let wake = tokio::select! {
            reply = exchange => Wake::Reply(reply),
            _ = tokio::time::sleep(self.timeout) => Wake::TimedOut,
            _ = cancel.cancelled() => Wake::Cancelled,
        };

        let reply = match wake {
            Wake::Reply(reply) => reply?,
            Wake::TimedOut => {
                if self.registry.cancel_save(id, ticket) {
                    warn!(
                        %id,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Timeout waiting for save response"
                    );
                    return Err(PreviewError::SaveTimeout {
                        id: id.to_string(),
                        elapsed: started.elapsed(),
                    });
                }
                // The response won the race and is already in the channel
                Self::take_delivered(id, &mut response)?
            }
            Wake::Cancelled => {
                if self.registry.cancel_save(id, ticket) {
                    info!(%id, "Save cancelled");
                    return Err(PreviewError::SaveCancelled(id.to_string()));
                }
                Self::take_delivered(id, &mut response)?
            }
        };

        match reply {
            Some(data) => self.persist(id, Bytes::from(data), started).await,
            None => {
                info!(%id, "No data received from render surface");
                Ok(())
            }
        }
    }

    /// Save the document through its registered surface
    pub async fn save_document(
        &self,
        id: &DocumentId,
        cancel: &CancellationToken,
    ) -> PreviewResult<()> {
        let session = self
            .registry
            .get(id)
            .ok_or_else(|| PreviewError::NoActiveSession(id.to_string()))?;
        self.perform_save(id, &session.surface, cancel).await
    }

    /// Save whichever document currently has focus
    pub async fn force_save(&self, cancel: &CancellationToken) -> PreviewResult<DocumentId> {
        let Some(session) = self.registry.lookup_active() else {
            debug!("No active editor found for force save");
            return Err(PreviewError::NoActiveSession("active editor".to_string()));
        };

        info!(id = %session.document_id, "Triggering force save");
        self.perform_save(&session.document_id, &session.surface, cancel)
            .await?;
        Ok(session.document_id)
    }

    /// Persist bytes the surface pushed without being asked
    pub async fn save_direct(&self, id: &DocumentId, data: Vec<u8>) -> PreviewResult<()> {
        info!(%id, bytes = data.len(), "Direct save received");
        self.persist(id, Bytes::from(data), Instant::now()).await
    }

    /// Write first; only a successful write updates the cache
    async fn persist(&self, id: &DocumentId, data: Bytes, started: Instant) -> PreviewResult<()> {
        debug!(%id, bytes = data.len(), "Writing document");
        if let Err(e) = self.store.write(id, &data).await {
            warn!(%id, error = %e, "Error writing file");
            return Err(e);
        }

        let size = data.len() as u64;
        self.cache.set(id.as_str(), data, size);
        self.registry.mark_dirty(id, false);

        info!(
            %id,
            bytes = size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "File saved successfully"
        );
        Ok(())
    }

    fn take_delivered(
        id: &DocumentId,
        response: &mut oneshot::Receiver<SaveReply>,
    ) -> PreviewResult<SaveReply> {
        response
            .try_recv()
            .map_err(|_| PreviewError::SurfaceClosed(id.to_string()))
    }
}
