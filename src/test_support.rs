//! In-memory collaborators shared by unit tests

use crate::document::DocumentId;
use crate::error::{PreviewError, PreviewResult};
use crate::storage::BackingStore;
use crate::transport::{HostMessage, SurfaceTransport};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Backing store over a map, counting every call
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<DocumentId, Bytes>>,
    /// Reported by `stat` instead of the real length when set
    stat_size: Mutex<Option<u64>>,
    stat_fails: Mutex<bool>,
    /// Number of upcoming reads that fail
    read_failures: AtomicUsize,
    write_fails: Mutex<bool>,
    /// Reads wait on this before returning when set
    gate: Mutex<Option<Arc<Notify>>>,
    pub reads: AtomicUsize,
    pub stats: AtomicUsize,
    pub writes: Mutex<Vec<(DocumentId, Vec<u8>)>>,
}

impl MemoryStore {
    pub fn with_file(id: &DocumentId, data: &[u8]) -> Arc<Self> {
        let store = Self::default();
        store.insert(id, data);
        Arc::new(store)
    }

    pub fn insert(&self, id: &DocumentId, data: &[u8]) {
        self.files
            .lock()
            .insert(id.clone(), Bytes::copy_from_slice(data));
    }

    pub fn file(&self, id: &DocumentId) -> Option<Bytes> {
        self.files.lock().get(id).cloned()
    }

    pub fn report_size(&self, size: u64) {
        *self.stat_size.lock() = Some(size);
    }

    pub fn fail_stat(&self) {
        *self.stat_fails.lock() = true;
    }

    pub fn fail_next_reads(&self, count: usize) {
        self.read_failures.store(count, Ordering::SeqCst);
    }

    pub fn fail_writes(&self) {
        *self.write_fails.lock() = true;
    }

    /// Hold reads until the returned notifier fires
    pub fn gate_reads(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn stat_count(&self) -> usize {
        self.stats.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn read(&self, id: &DocumentId) -> PreviewResult<Bytes> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        // Snapshot first so a gated read returns what was on disk when it began
        let failing = self
            .read_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let result = if failing {
            Err(PreviewError::read(
                id.as_str(),
                io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            ))
        } else {
            self.file(id)
                .ok_or_else(|| PreviewError::read(id.as_str(), io::ErrorKind::NotFound.into()))
        };

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn stat(&self, id: &DocumentId) -> PreviewResult<u64> {
        self.stats.fetch_add(1, Ordering::SeqCst);

        if *self.stat_fails.lock() {
            return Err(PreviewError::io(
                format!("stat {}", id),
                io::Error::new(io::ErrorKind::Unsupported, "stat unavailable"),
            ));
        }
        if let Some(size) = *self.stat_size.lock() {
            return Ok(size);
        }
        Ok(self.file(id).map(|d| d.len() as u64).unwrap_or(0))
    }

    async fn write(&self, id: &DocumentId, data: &[u8]) -> PreviewResult<()> {
        if *self.write_fails.lock() {
            return Err(PreviewError::write(
                id.as_str(),
                io::Error::other("disk full"),
            ));
        }
        self.writes.lock().push((id.clone(), data.to_vec()));
        self.insert(id, data);
        Ok(())
    }
}

/// Transport that records every outgoing message
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<HostMessage>>,
    fails: Mutex<bool>,
    /// Sends never complete, like a writer stuck on backpressure
    stalls: Mutex<bool>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<HostMessage> {
        self.sent.lock().clone()
    }

    pub fn fail_sends(&self) {
        *self.fails.lock() = true;
    }

    pub fn stall_sends(&self) {
        *self.stalls.lock() = true;
    }

    pub fn save_requests(&self) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|m| matches!(m, HostMessage::Save))
            .count()
    }
}

#[async_trait]
impl SurfaceTransport for RecordingTransport {
    async fn send(&self, message: HostMessage) -> PreviewResult<()> {
        let stalled = *self.stalls.lock();
        if stalled {
            return std::future::pending().await;
        }
        if *self.fails.lock() {
            return Err(PreviewError::Transport("surface gone".to_string()));
        }
        self.sent.lock().push(message);
        Ok(())
    }
}
