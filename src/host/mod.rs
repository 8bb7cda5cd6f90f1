//! Preview host: wires documents, sessions and saves together
//!
//! Constructed once at activation and disposed at shutdown. Callers own the
//! channel to each render surface: outgoing messages go through the
//! transport passed to [`PreviewHost::open`], incoming ones are fed to
//! [`PreviewHost::handle_message`].

use crate::cache::DocumentCache;
use crate::config::{Config, SurfaceConfig};
use crate::document::{DocumentAccess, DocumentId, DocumentSource, SizeGuard};
use crate::error::{PreviewError, PreviewResult};
use crate::save::SaveCoordinator;
use crate::session::{SessionRegistry, SurfaceHandle};
use crate::storage::BackingStore;
use crate::transport::{HostMessage, SurfaceMessage, SurfaceTransport};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Location of the viewer's WASM engine as seen by the surface
pub const DEFAULT_WASM_URI: &str = "media/pdfium.wasm";

/// Owns the cache, the session registry and the save coordinator
pub struct PreviewHost {
    cache: Arc<DocumentCache>,
    registry: Arc<SessionRegistry>,
    saves: SaveCoordinator,
    store: Arc<dyn BackingStore>,
    documents: Mutex<HashMap<DocumentId, Arc<DocumentAccess>>>,
    guard: SizeGuard,
    surface_config: SurfaceConfig,
    wasm_uri: String,
    uri_mode: bool,
}

impl PreviewHost {
    /// Build all shared state from configuration
    pub fn activate(config: &Config, store: Arc<dyn BackingStore>) -> Self {
        let cache = Arc::new(DocumentCache::with_capacity(config.cache.capacity));
        let registry = Arc::new(SessionRegistry::new());
        let saves = SaveCoordinator::new(registry.clone(), cache.clone(), store.clone())
            .with_timeout(config.save.timeout());

        info!(
            capacity = cache.capacity(),
            restricted = config.document.restricted,
            "Preview host activated"
        );

        Self {
            cache,
            registry,
            saves,
            store,
            documents: Mutex::new(HashMap::new()),
            guard: SizeGuard::from(&config.document),
            surface_config: config.viewer.to_surface_config(),
            wasm_uri: DEFAULT_WASM_URI.to_string(),
            uri_mode: false,
        }
    }

    /// Let the surface load URI-backed documents itself instead of
    /// receiving their bytes
    pub fn with_uri_mode(mut self, uri_mode: bool) -> Self {
        self.uri_mode = uri_mode;
        self
    }

    pub fn with_wasm_uri(mut self, wasm_uri: impl Into<String>) -> Self {
        self.wasm_uri = wasm_uri.into();
        self
    }

    pub fn cache(&self) -> &Arc<DocumentCache> {
        &self.cache
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn saves(&self) -> &SaveCoordinator {
        &self.saves
    }

    /// Open a document in a render surface and give it focus
    pub fn open(&self, source: DocumentSource, transport: Arc<dyn SurfaceTransport>) -> DocumentId {
        let id = source.id().clone();
        info!(%id, "Resolving preview");

        {
            let mut documents = self.documents.lock();
            // Re-opening a URI-backed document keeps its accessor so a read
            // already in flight is joined, never duplicated
            let reuse = !source.is_in_memory() && documents.contains_key(&id);
            if reuse {
                debug!(%id, "Reusing open document");
            } else {
                let access = Arc::new(DocumentAccess::new(
                    source,
                    self.cache.clone(),
                    self.store.clone(),
                    self.guard,
                ));
                documents.insert(id.clone(), access);
            }
        }

        self.registry.register(&id, SurfaceHandle::new(transport));
        self.registry.focus(&id);
        id
    }

    /// Document accessor for an open document
    pub fn document(&self, id: &DocumentId) -> Option<Arc<DocumentAccess>> {
        self.documents.lock().get(id).cloned()
    }

    /// Dispatch one message from the surface showing `id`
    pub async fn handle_message(&self, id: &DocumentId, message: SurfaceMessage) -> PreviewResult<()> {
        match message {
            SurfaceMessage::Ready => self.send_preview(id).await,
            SurfaceMessage::SaveResponse { data } => {
                if !self.registry.resolve_save(id, data) {
                    debug!(%id, "Save response without pending request");
                }
                Ok(())
            }
            SurfaceMessage::SaveDirect { data } => match data {
                Some(data) => self.save_direct(id, data).await,
                None => Ok(()),
            },
            SurfaceMessage::Dirty => {
                debug!(%id, "Document marked dirty");
                self.registry.mark_dirty(id, true);
                Ok(())
            }
            SurfaceMessage::Error { error } => {
                warn!(%id, %error, "Render surface error");
                Ok(())
            }
            SurfaceMessage::Log { message } => {
                info!(%id, "[surface] {}", message);
                Ok(())
            }
            SurfaceMessage::Close => {
                self.close(id);
                Ok(())
            }
        }
    }

    /// Reload a document from the backing store, dropping cached bytes
    pub async fn revert(&self, id: &DocumentId) -> PreviewResult<()> {
        info!(%id, "Reverting document");
        self.cache.delete(id.as_str());
        self.registry.mark_dirty(id, false);

        if self.registry.get(id).is_some() {
            self.send_preview(id).await?;
        }
        Ok(())
    }

    /// Save a document through its surface
    pub async fn save(&self, id: &DocumentId, cancel: &CancellationToken) -> PreviewResult<()> {
        self.saves.save_document(id, cancel).await
    }

    /// Save the focused document
    pub async fn force_save(&self, cancel: &CancellationToken) -> PreviewResult<DocumentId> {
        self.saves.force_save(cancel).await
    }

    pub fn focus(&self, id: &DocumentId) -> bool {
        self.registry.focus(id)
    }

    /// Surface was closed
    pub fn close(&self, id: &DocumentId) {
        if let Some(access) = self.documents.lock().remove(id) {
            access.dispose();
        }
        self.registry.remove(id);
        info!(%id, "Preview disposed");
    }

    /// Release all state; pending saves fail with `SurfaceClosed`
    pub fn dispose(&self) {
        for (_, access) in self.documents.lock().drain() {
            access.dispose();
        }
        self.registry.clear();
        self.cache.clear();
        info!("Preview host disposed");
    }

    async fn send_preview(&self, id: &DocumentId) -> PreviewResult<()> {
        let started = Instant::now();
        let session = self
            .registry
            .get(id)
            .ok_or_else(|| PreviewError::NoActiveSession(id.to_string()))?;
        let access = self
            .document(id)
            .ok_or_else(|| PreviewError::NoActiveSession(id.to_string()))?;

        let mut pdf_uri = None;
        let mut data = None;
        if self.uri_mode && !access.source().is_in_memory() {
            debug!(%id, "Strategy: URI mode");
            pdf_uri = Some(id.to_uri());
        } else {
            debug!(%id, "Strategy: data injection mode");
            match access.get_file_data().await {
                Ok(bytes) => data = Some(bytes.to_vec()),
                Err(e) => {
                    warn!(%id, error = %e, "Error loading file data");
                    return session
                        .surface
                        .send(HostMessage::Error {
                            error: e.to_string(),
                        })
                        .await;
                }
            }
        }

        session
            .surface
            .send(HostMessage::Preview {
                wasm_uri: self.wasm_uri.clone(),
                config: self.surface_config.clone(),
                pdf_uri,
                data,
            })
            .await?;

        info!(
            %id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Preview sent"
        );
        Ok(())
    }

    async fn save_direct(&self, id: &DocumentId, data: Vec<u8>) -> PreviewResult<()> {
        if id.is_in_memory() {
            debug!(%id, "Ignoring direct save for in-memory document");
            return Ok(());
        }

        if let Err(e) = self.saves.save_direct(id, data).await {
            warn!(%id, error = %e, "Direct save failed");
            if let Some(session) = self.registry.get(id) {
                session
                    .surface
                    .send(HostMessage::Error {
                        error: format!("Failed to save file: {}", e),
                    })
                    .await?;
            }
        }
        Ok(())
    }
}
