//! Error types for pdf-preview
//!
//! All modules use `PreviewResult<T>` as their return type. The error is
//! `Clone` so a single failed read can be handed to every caller that was
//! waiting on it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for pdf-preview operations
pub type PreviewResult<T> = Result<T, PreviewError>;

/// All errors that can occur in pdf-preview
#[derive(Error, Debug, Clone)]
pub enum PreviewError {
    // Document read errors
    #[error(
        "File is too large ({size_mb:.1}MB) for this environment (Max {limit_mb}MB). Please use a desktop environment."
    )]
    FileTooLarge { size_mb: f64, limit_mb: u64 },

    #[error("Failed to read {id}: {source}")]
    FileRead {
        id: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("Unsupported document location: {0}")]
    UnsupportedDocument(String),

    // Save errors
    #[error("No active session for {0}")]
    NoActiveSession(String),

    #[error("Save already in progress for {0}")]
    SaveInProgress(String),

    #[error("Save timed out after {}s", .elapsed.as_secs())]
    SaveTimeout { id: String, elapsed: Duration },

    #[error("Save cancelled")]
    SaveCancelled(String),

    #[error("Render surface closed before responding for {0}")]
    SurfaceClosed(String),

    #[error("Failed to write {id}: {source}")]
    FileWrite {
        id: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    // Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(Arc<serde_json::Error>),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl PreviewError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source: Arc::new(source),
        }
    }

    /// Create a read error for a document
    pub fn read(id: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileRead {
            id: id.into(),
            source: Arc::new(source),
        }
    }

    /// Create a write error for a document
    pub fn write(id: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileWrite {
            id: id.into(),
            source: Arc::new(source),
        }
    }

    /// Build the size guard error from a byte count and a limit in MB
    pub fn too_large(size: u64, limit_mb: u64) -> Self {
        Self::FileTooLarge {
            size_mb: size as f64 / 1024.0 / 1024.0,
            limit_mb,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FileRead { .. } | Self::FileWrite { .. } | Self::SaveTimeout { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::FileTooLarge { .. } => Some("Open the file from a desktop environment"),
            Self::SaveTimeout { .. } => Some("The viewer did not answer; try saving again"),
            Self::NoActiveSession(_) => Some("Open the document in the viewer first"),
            Self::SaveInProgress(_) => Some("Wait for the pending save to finish"),
            Self::ConfigInvalid { .. } => Some("Run: pdf-preview config init --force"),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PreviewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(Arc::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PreviewError::too_large(150 * 1024 * 1024, 100);
        let msg = err.to_string();
        assert!(msg.contains("File is too large (150.0MB)"));
        assert!(msg.contains("Max 100MB"));
    }

    #[test]
    fn error_hint() {
        let err = PreviewError::NoActiveSession("file:///a.pdf".to_string());
        assert_eq!(err.hint(), Some("Open the document in the viewer first"));
    }

    #[test]
    fn error_retryable() {
        let read = PreviewError::read("file:///a.pdf", std::io::ErrorKind::NotFound.into());
        assert!(read.is_retryable());
        assert!(!PreviewError::SaveCancelled("file:///a.pdf".to_string()).is_retryable());
    }

    #[test]
    fn error_clone_keeps_source() {
        let err = PreviewError::read("file:///a.pdf", std::io::ErrorKind::NotFound.into());
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
        assert!(std::error::Error::source(&cloned).is_some());
    }

    #[test]
    fn timeout_display() {
        let err = PreviewError::SaveTimeout {
            id: "file:///a.pdf".to_string(),
            elapsed: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Save timed out after 30s");
    }
}
