//! Messages exchanged with the render surface
//!
//! Every message is a JSON object tagged by `command`. Byte payloads are
//! plain arrays of numbers.

use crate::config::SurfaceConfig;
use crate::error::PreviewResult;
use serde::{Deserialize, Serialize};

/// Host to render surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum HostMessage {
    /// Load a document, either by URI or by injected bytes
    #[serde(rename_all = "camelCase")]
    Preview {
        wasm_uri: String,
        config: SurfaceConfig,
        #[serde(skip_serializing_if = "Option::is_none")]
        pdf_uri: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Vec<u8>>,
    },

    /// Ask the surface to serialize its current document
    Save,

    /// Report a host-side failure to the surface
    Error { error: String },
}

/// Render surface to host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum SurfaceMessage {
    /// Surface finished loading and wants the document
    Ready,

    /// Answer to a `save` request; no data means nothing to persist
    SaveResponse {
        #[serde(default)]
        data: Option<Vec<u8>>,
    },

    /// Unsolicited save (e.g. keyboard shortcut inside the viewer)
    SaveDirect {
        #[serde(default)]
        data: Option<Vec<u8>>,
    },

    /// Document was modified in the viewer
    Dirty,

    Error { error: String },

    Log { message: String },

    /// Surface asked to be closed
    Close,
}

/// Encode a host message as one JSON line (without the newline)
pub fn encode_line(message: &HostMessage) -> PreviewResult<String> {
    Ok(serde_json::to_string(message)?)
}

/// Decode one JSON line from the surface
pub fn decode_line(line: &str) -> PreviewResult<SurfaceMessage> {
    Ok(serde_json::from_str(line.trim())?)
}
