//! Message transport to the render surface
//!
//! The surface lives in an isolated context and only talks through
//! asynchronous messages. Outgoing messages go through a
//! [`SurfaceTransport`]; incoming ones are handed to
//! [`crate::host::PreviewHost::handle_message`] by whoever owns the channel.

mod messages;
mod stdio;

pub use messages::{decode_line, encode_line, HostMessage, SurfaceMessage};
pub use stdio::StdioTransport;

use crate::error::PreviewResult;
use async_trait::async_trait;

/// Outgoing half of the render surface channel
#[async_trait]
pub trait SurfaceTransport: Send + Sync {
    /// Deliver a message to the surface
    async fn send(&self, message: HostMessage) -> PreviewResult<()>;
}
