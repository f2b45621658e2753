//! Socket listener and per-connection protocol loop.

use std::io::ErrorKind;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

use zoneshift_app::engine::EngineHandle;
use zoneshift_domain::error::{ValidationError, ZoneShiftError};
use zoneshift_domain::event::MAX_EVENT_BYTES;

/// Errors from socket setup.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to remove stale socket at {path}")]
    RemoveStale {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to bind socket at {path}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restrict permissions on socket at {path}")]
    Permissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Listening socket plus the engine handle connections submit into.
pub struct UdsIngest {
    listener: UnixListener,
    handle: EngineHandle,
    default_source: String,
}

impl UdsIngest {
    /// Bind the socket, replacing a stale file left by a previous run.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] when the stale file cannot be removed or the
    /// bind fails.
    pub fn bind(
        path: &Path,
        handle: EngineHandle,
        default_source: impl Into<String>,
    ) -> Result<Self, IngestError> {
        if let Err(err) = std::fs::remove_file(path) {
            if err.kind() != ErrorKind::NotFound {
                return Err(IngestError::RemoveStale {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        }
        let listener = UnixListener::bind(path).map_err(|err| IngestError::Bind {
            path: path.to_path_buf(),
            source: err,
        })?;
        // Owner and group only; agents run under the same account.
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o660)).map_err(|err| {
            IngestError::Permissions {
                path: path.to_path_buf(),
                source: err,
            }
        })?;
        tracing::info!(path = %path.display(), "event socket listening");
        Ok(Self {
            listener,
            handle,
            default_source: default_source.into(),
        })
    }

    /// Accept connections until the engine shuts down. Each connection gets
    /// its own task; the single engine queue serializes the events.
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let handle = self.handle.clone();
                    let source = self.default_source.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, handle, source).await;
                    });
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to accept socket connection");
                }
            }
        }
    }
}

#[tracing::instrument(skip_all)]
async fn handle_connection(stream: UnixStream, handle: EngineHandle, default_source: String) {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    loop {
        let line = match next_line_capped(&mut reader, MAX_EVENT_BYTES).await {
            Ok(Some(Frame::Line(line))) => line,
            Ok(Some(Frame::Oversized)) => {
                let detail = ValidationError::EventTooLarge {
                    limit: MAX_EVENT_BYTES,
                };
                tracing::debug!(error = %detail, "event rejected");
                let reply = serde_json::json!({ "error": detail.to_string() });
                if write_reply(&mut writer, &reply).await.is_err() {
                    break;
                }
                continue;
            }
            Ok(None) => break,
            Err(err) => {
                tracing::debug!(error = %err, "connection read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let reply = match handle.submit_raw(&line, &default_source).await {
            Ok(event_id) => serde_json::json!({ "ok": true, "eventId": event_id }),
            Err(err @ ZoneShiftError::Closed) => {
                tracing::info!("engine stopped, closing connection");
                let _ = write_reply(&mut writer, &serde_json::json!({ "error": err.to_string() }))
                    .await;
                return;
            }
            Err(err) => {
                tracing::debug!(error = %err, "event rejected");
                serde_json::json!({ "error": err.to_string() })
            }
        };
        if write_reply(&mut writer, &reply).await.is_err() {
            break;
        }
    }
}

enum Frame {
    Line(String),
    Oversized,
}

/// Read one newline-terminated line, never holding more than `max` bytes of
/// it in memory. The remainder of an over-limit line is consumed and
/// discarded so the connection stays usable.
async fn next_line_capped<R>(reader: &mut R, max: usize) -> std::io::Result<Option<Frame>>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            if buf.is_empty() {
                return Ok(None);
            }
            break;
        }
        if let Some(pos) = chunk.iter().position(|&b| b == b'\n') {
            if buf.len() + pos > max {
                reader.consume(pos + 1);
                return Ok(Some(Frame::Oversized));
            }
            buf.extend_from_slice(&chunk[..pos]);
            reader.consume(pos + 1);
            break;
        }
        let len = chunk.len();
        if buf.len() + len > max {
            reader.consume(len);
            discard_to_newline(reader).await?;
            return Ok(Some(Frame::Oversized));
        }
        buf.extend_from_slice(chunk);
        reader.consume(len);
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    let line = String::from_utf8(buf)
        .map_err(|err| std::io::Error::new(ErrorKind::InvalidData, err))?;
    Ok(Some(Frame::Line(line)))
}

async fn discard_to_newline<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(());
        }
        if let Some(pos) = chunk.iter().position(|&b| b == b'\n') {
            reader.consume(pos + 1);
            return Ok(());
        }
        let len = chunk.len();
        reader.consume(len);
    }
}

async fn write_reply(
    writer: &mut tokio::net::unix::OwnedWriteHalf,
    reply: &serde_json::Value,
) -> std::io::Result<()> {
    let mut buf = reply.to_string().into_bytes();
    buf.push(b'\n');
    writer.write_all(&buf).await
}
