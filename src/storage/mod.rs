//! Backing store abstraction
//!
//! The document bytes live somewhere the host can read and write
//! (local disk, a remote filesystem). The core only talks to them through
//! [`BackingStore`].

mod fs;

pub use fs::FsStore;

use crate::document::DocumentId;
use crate::error::PreviewResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Read/stat/write access to document bytes
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Read the full contents of a document
    async fn read(&self, id: &DocumentId) -> PreviewResult<Bytes>;

    /// Size of a document in bytes without reading it
    async fn stat(&self, id: &DocumentId) -> PreviewResult<u64>;

    /// Replace the contents of a document
    async fn write(&self, id: &DocumentId, data: &[u8]) -> PreviewResult<()>;
}
