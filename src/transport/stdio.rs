//! JSON-lines transport over any async writer

use super::{encode_line, HostMessage, SurfaceTransport};
use crate::error::{PreviewError, PreviewResult};
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Writes one JSON message per line
pub struct StdioTransport<W> {
    writer: Mutex<W>,
}

impl<W> StdioTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer (used by tests to inspect output)
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> SurfaceTransport for StdioTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, message: HostMessage) -> PreviewResult<()> {
        let mut line = encode_line(&message)?;
        line.push('\n');

        // Lines must not interleave when several tasks send at once
        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| PreviewError::Transport(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| PreviewError::Transport(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_one_line_per_message() {
        let transport = StdioTransport::new(Vec::new());

        transport.send(HostMessage::Save).await.unwrap();
        transport
            .send(HostMessage::Error {
                error: "boom".to_string(),
            })
            .await
            .unwrap();

        let output = String::from_utf8(transport.into_inner()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"command":"save"}"#);
        assert_eq!(lines[1], r#"{"command":"error","error":"boom"}"#);
    }
}
