//! Local filesystem store for `file://` documents

use super::BackingStore;
use crate::document::DocumentId;
use crate::error::{PreviewError, PreviewResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;

/// Backing store over the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }

    fn path(id: &DocumentId) -> PreviewResult<PathBuf> {
        id.to_path()
            .ok_or_else(|| PreviewError::UnsupportedDocument(id.to_string()))
    }
}

#[async_trait]
impl BackingStore for FsStore {
    async fn read(&self, id: &DocumentId) -> PreviewResult<Bytes> {
        let path = Self::path(id)?;
        let data = fs::read(&path)
            .await
            .map_err(|e| PreviewError::read(id.as_str(), e))?;
        Ok(Bytes::from(data))
    }

    async fn stat(&self, id: &DocumentId) -> PreviewResult<u64> {
        let path = Self::path(id)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| PreviewError::io(format!("stat {}", path.display()), e))?;
        Ok(meta.len())
    }

    async fn write(&self, id: &DocumentId, data: &[u8]) -> PreviewResult<()> {
        let path = Self::path(id)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PreviewError::write(id.as_str(), e))?;
        }

        fs::write(&path, data)
            .await
            .map_err(|e| PreviewError::write(id.as_str(), e))?;
        Ok(())
    }
}
