//! Destination for echoed lines and non-fatal stream errors.

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::warn;

use crate::types::{StreamKind, StreamReadError};

/// Collaborator that receives live output from a running command.
///
/// A drain task calls [`echo`](OutputSink::echo) once per line, in arrival
/// order, when echo is enabled for that stream. Both drain tasks share one
/// sink, so implementations must tolerate concurrent calls for different
/// streams.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Write one line (without its terminator) to the console for `stream`.
    async fn echo(&self, stream: StreamKind, line: &str);

    /// Report a read failure that ended draining of a stream.
    async fn stream_error(&self, error: &StreamReadError);
}

/// Sink that echoes to the parent's own stdout/stderr and logs stream
/// errors through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

#[async_trait]
impl OutputSink for ConsoleSink {
    async fn echo(&self, stream: StreamKind, line: &str) {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');

        let result = match stream {
            StreamKind::Stdout => {
                let mut out = tokio::io::stdout();
                match out.write_all(buf.as_bytes()).await {
                    Ok(()) => out.flush().await,
                    Err(e) => Err(e),
                }
            }
            StreamKind::Stderr => {
                let mut out = tokio::io::stderr();
                match out.write_all(buf.as_bytes()).await {
                    Ok(()) => out.flush().await,
                    Err(e) => Err(e),
                }
            }
        };

        if let Err(e) = result {
            warn!(stream = %stream, error = %e, "Failed to echo line to console");
        }
    }

    async fn stream_error(&self, error: &StreamReadError) {
        warn!(stream = %error.stream, error = %error.source, "Stream draining stopped early");
    }
}
