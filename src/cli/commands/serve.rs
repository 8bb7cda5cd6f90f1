//! Serve command - drive one render surface over stdin/stdout
//!
//! The surface speaks JSON lines: host messages go to stdout, surface
//! messages are read from stdin. Logs go to stderr.

use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::document::{DocumentId, DocumentSource};
use crate::error::{PreviewError, PreviewResult};
use crate::host::PreviewHost;
use crate::storage::{BackingStore, FsStore};
use crate::transport::{decode_line, StdioTransport, SurfaceMessage};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: &Config) -> PreviewResult<()> {
    let mut config = config.clone();
    if args.restricted {
        config.document.restricted = true;
    }

    if !args.file.exists() {
        return Err(PreviewError::User(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let store: Arc<dyn BackingStore> = Arc::new(FsStore::new());
    let host = Arc::new(PreviewHost::activate(&config, store).with_uri_mode(args.uri_mode));
    let transport = Arc::new(StdioTransport::new(tokio::io::stdout()));
    let id = host.open(DocumentSource::from_path(&args.file), transport);

    let cancel = CancellationToken::new();
    let reader = BufReader::new(tokio::io::stdin());
    let result = serve_lines(&host, &id, reader, args.autosave, &cancel).await;

    host.dispose();
    result
}

/// Feed surface messages to the host until the surface closes or input ends
pub async fn serve_lines<R>(
    host: &Arc<PreviewHost>,
    id: &DocumentId,
    reader: R,
    autosave: bool,
    cancel: &CancellationToken,
) -> PreviewResult<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut saves = JoinSet::new();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => {
                line.map_err(|e| PreviewError::io("reading surface messages", e))?
            }
            _ = &mut ctrl_c => {
                info!("Interrupted, shutting down");
                break;
            }
        };

        let Some(line) = line else {
            debug!("Surface input closed");
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let message = match decode_line(&line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed surface message");
                continue;
            }
        };

        let closing = message == SurfaceMessage::Close;
        let dirty = message == SurfaceMessage::Dirty;

        host.handle_message(id, message).await?;

        if dirty && autosave {
            // Spawned so the save response can arrive on this same loop
            let host = Arc::clone(host);
            let id = id.clone();
            let cancel = cancel.clone();
            saves.spawn(async move {
                match host.save(&id, &cancel).await {
                    Ok(()) => {}
                    Err(PreviewError::SaveInProgress(_)) => debug!(%id, "Autosave skipped"),
                    Err(e) => warn!(%id, error = %e, "Autosave failed"),
                }
            });
        }

        // Reap finished autosaves so a long session does not accumulate them
        while saves.try_join_next().is_some() {}

        if closing {
            break;
        }
    }

    cancel.cancel();
    while saves.join_next().await.is_some() {}
    Ok(())
}
