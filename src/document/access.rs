//! Cached, coalesced access to one document's bytes
//!
//! Reads go cache first. On a miss, the first caller starts a single read
//! against the backing store and every caller arriving while it is pending
//! awaits the same shared future. The in-flight slot is cleared when the
//! read settles, whether it succeeded or not, so failures are never replayed.

use super::source::{DocumentId, DocumentSource};
use crate::cache::DocumentCache;
use crate::config::schema::DocumentConfig;
use crate::error::{PreviewError, PreviewResult};
use crate::storage::BackingStore;
use bytes::Bytes;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type ReadFuture = Shared<BoxFuture<'static, PreviewResult<Bytes>>>;

/// Size limit applied before reading in restricted environments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeGuard {
    /// Whether the guard applies at all
    pub restricted: bool,
    pub limit_mb: u64,
}

impl SizeGuard {
    pub fn unrestricted() -> Self {
        Self {
            restricted: false,
            limit_mb: DocumentConfig::default().max_restricted_size_mb,
        }
    }

    pub fn limit_bytes(&self) -> u64 {
        self.limit_mb.saturating_mul(1024 * 1024)
    }
}

impl From<&DocumentConfig> for SizeGuard {
    fn from(config: &DocumentConfig) -> Self {
        Self {
            restricted: config.restricted,
            limit_mb: config.max_restricted_size_mb,
        }
    }
}

/// Owns one open document and serves its bytes
pub struct DocumentAccess {
    source: DocumentSource,
    cache: Arc<DocumentCache>,
    store: Arc<dyn BackingStore>,
    guard: SizeGuard,
    in_flight: Arc<Mutex<Option<ReadFuture>>>,
}

impl DocumentAccess {
    pub fn new(
        source: DocumentSource,
        cache: Arc<DocumentCache>,
        store: Arc<dyn BackingStore>,
        guard: SizeGuard,
    ) -> Self {
        Self {
            source,
            cache,
            store,
            guard,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> &DocumentId {
        self.source.id()
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Current bytes of the document
    ///
    /// In-memory documents return their bytes directly. URI-backed documents
    /// are served from the cache, or from a single shared backing-store read.
    pub async fn get_file_data(&self) -> PreviewResult<Bytes> {
        let id = match &self.source {
            DocumentSource::InMemory { data, .. } => return Ok(data.clone()),
            DocumentSource::UriBacked { id } => id,
        };

        if let Some(data) = self.cache.get(id.as_str()) {
            return Ok(data);
        }

        let read = {
            let mut slot = self.in_flight.lock();
            match slot.as_ref() {
                Some(read) => {
                    debug!(%id, "Joining in-flight read");
                    read.clone()
                }
                None => {
                    let read = self.start_read(id.clone());
                    *slot = Some(read.clone());
                    read
                }
            }
        };

        read.await
    }

    /// Drop the cached bytes so the next call reads the backing store
    pub fn invalidate(&self) -> bool {
        self.cache.delete(self.id().as_str())
    }

    /// Whether a backing-store read is currently pending
    pub fn is_reading(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    /// Forget a pending read; callers already awaiting it still get a result
    pub fn dispose(&self) {
        self.in_flight.lock().take();
    }

    fn start_read(&self, id: DocumentId) -> ReadFuture {
        let cache = Arc::clone(&self.cache);
        let store = Arc::clone(&self.store);
        let in_flight = Arc::clone(&self.in_flight);
        let guard = self.guard;
        // A save or revert during the read makes its bytes stale
        let generation = cache.generation(id.as_str());

        async move {
            let result = read_from_store(store.as_ref(), &id, guard).await;
            if let Ok(data) = &result {
                cache.fill(id.as_str(), data.clone(), data.len() as u64, generation);
            }
            in_flight.lock().take();
            result
        }
        .boxed()
        .shared()
    }
}

async fn read_from_store(
    store: &dyn BackingStore,
    id: &DocumentId,
    guard: SizeGuard,
) -> PreviewResult<Bytes> {
    if guard.restricted {
        match store.stat(id).await {
            Ok(size) if size > guard.limit_bytes() => {
                warn!(%id, size, limit_mb = guard.limit_mb, "Document exceeds size limit");
                return Err(PreviewError::too_large(size, guard.limit_mb));
            }
            Ok(_) => {}
            // Probe failures are not fatal; the read below decides
            Err(e) => debug!(%id, error = %e, "Size check failed, reading anyway"),
        }
    }

    let started = Instant::now();
    let data = store.read(id).await.inspect_err(|e| {
        warn!(%id, error = %e, "Document read failed");
    })?;

    info!(
        %id,
        elapsed_ms = started.elapsed().as_millis() as u64,
        bytes = data.len(),
        "Document data loaded"
    );
    Ok(data)
}
