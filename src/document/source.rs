//! Document identity and data sources

use crate::error::{PreviewError, PreviewResult};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";
const IN_MEMORY_SCHEME: &str = "pdf-api:///";

/// Default title for documents handed over as raw bytes
pub const DEFAULT_IN_MEMORY_NAME: &str = "PDF Preview (via API)";

/// Opaque key for cache and session state
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier for a file on the local filesystem
    pub fn from_path(path: &Path) -> Self {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        Self(format!("{}{}", FILE_SCHEME, absolute.display()))
    }

    /// Synthetic identifier for a document that only exists in memory
    pub fn in_memory(name: &str) -> Self {
        Self(format!("{}{}", IN_MEMORY_SCHEME, urlencoding::encode(name)))
    }

    /// Filesystem path for `file://` identifiers
    pub fn to_path(&self) -> Option<PathBuf> {
        self.0.strip_prefix(FILE_SCHEME).map(PathBuf::from)
    }

    /// URI form for the render surface, with `file://` path segments
    /// percent-encoded
    pub fn to_uri(&self) -> String {
        match self.0.strip_prefix(FILE_SCHEME) {
            Some(path) => {
                let segments: Vec<_> = path.split('/').map(urlencoding::encode).collect();
                format!("{}{}", FILE_SCHEME, segments.join("/"))
            }
            None => self.0.clone(),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.0.starts_with(IN_MEMORY_SCHEME)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where a document's bytes come from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// Bytes live in the backing store under `id`
    UriBacked { id: DocumentId },

    /// Bytes were handed over directly and are never persisted
    InMemory {
        id: DocumentId,
        name: String,
        data: Bytes,
    },
}

impl DocumentSource {
    /// Source for a file on disk
    pub fn from_path(path: &Path) -> Self {
        Self::UriBacked {
            id: DocumentId::from_path(path),
        }
    }

    /// Source for an identifier the backing store understands
    pub fn from_id(id: DocumentId) -> Self {
        Self::UriBacked { id }
    }

    /// In-memory source from raw bytes
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::InMemory {
            id: DocumentId::in_memory(DEFAULT_IN_MEMORY_NAME),
            name: DEFAULT_IN_MEMORY_NAME.to_string(),
            data: data.into(),
        }
    }

    /// In-memory source from base64 text
    pub fn from_base64(text: &str) -> PreviewResult<Self> {
        let data = BASE64
            .decode(text.trim())
            .map_err(|e| PreviewError::User(format!("Invalid base64 document data: {}", e)))?;
        Ok(Self::from_bytes(data))
    }

    /// Rename an in-memory source; the identifier follows the name
    pub fn with_name(self, new_name: &str) -> Self {
        match self {
            Self::InMemory { data, .. } => Self::InMemory {
                id: DocumentId::in_memory(new_name),
                name: new_name.to_string(),
                data,
            },
            uri @ Self::UriBacked { .. } => uri,
        }
    }

    pub fn id(&self) -> &DocumentId {
        match self {
            Self::UriBacked { id } | Self::InMemory { id, .. } => id,
        }
    }

    /// Human-readable title
    pub fn name(&self) -> String {
        match self {
            Self::UriBacked { id } => id
                .to_path()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .unwrap_or_else(|| id.to_string()),
            Self::InMemory { name, .. } => name.clone(),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        matches!(self, Self::InMemory { .. })
    }
}
