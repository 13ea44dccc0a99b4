//! Snapshot ingest over a Unix domain socket.
//!
//! The aggregation engine connects and writes one JSON snapshot per line;
//! each line becomes a flush event on the bus, stamped with its arrival
//! time. The literal line `status` requests the backend's diagnostic
//! stamps, answered as JSON lines on the same connection.

use anyhow::{Context, Result};
use statstore_core::events::unix_now;
use statstore_core::{EventBus, MetricsSnapshot, SinkEvent};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, warn};

/// How long to wait for further status entries before considering the
/// report complete.
const STATUS_DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/// Bind the snapshot socket, replacing a stale socket file if present.
pub fn bind(path: &Path) -> Result<UnixListener> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("failed to remove stale socket {}", path.display()))?;
    }
    UnixListener::bind(path).with_context(|| format!("failed to bind {}", path.display()))
}

/// Accept engine connections until the task is aborted.
pub async fn run(listener: UnixListener, bus: EventBus) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let bus = bus.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve(stream, bus).await {
                        warn!(error = %e, "snapshot connection closed with error");
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "failed to accept snapshot connection");
            }
        }
    }
}

/// Drive one engine connection: flush lines in, status entries out.
async fn serve(stream: UnixStream, bus: EventBus) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == "status" {
            let (reply, mut entries) = mpsc::unbounded_channel();
            bus.publish(SinkEvent::Status { reply });

            // The bus retains the published event, so the reply channel
            // does not close when the backend is done; drain until idle.
            while let Ok(Some(entry)) = timeout(STATUS_DRAIN_TIMEOUT, entries.recv()).await {
                let json = serde_json::json!({
                    "error": entry.error,
                    "category": entry.category,
                    "key": entry.key,
                    "value": entry.value,
                });
                writer.write_all(json.to_string().as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            continue;
        }

        match serde_json::from_str::<MetricsSnapshot>(line) {
            Ok(snapshot) => {
                debug!("snapshot received");
                bus.publish(SinkEvent::Flush {
                    timestamp: unix_now(),
                    snapshot: Arc::new(snapshot),
                });
            }
            Err(e) => {
                warn!(error = %e, "discarding malformed snapshot line");
            }
        }
    }

    Ok(())
}
