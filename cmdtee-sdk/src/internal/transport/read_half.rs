//! Read half for a subprocess output stream.
//!
//! Each output stream gets its own drain task. Draining both streams
//! concurrently is what keeps a child that fills one pipe from blocking while
//! the parent waits on the other.

use std::sync::Arc;

use encoding_rs::Encoding;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::line_decoder::LineDecoder;
use crate::types::{CaptureBuffer, OutputSink, StreamKind, StreamReadError};

const READ_CHUNK_SIZE: usize = 8 * 1024;
const LINE_CHANNEL_CAPACITY: usize = 100;

/// How a drained stream is decoded and observed.
pub struct DrainConfig {
    pub encoding: Option<&'static Encoding>,
    pub echo: bool,
    pub sink: Arc<dyn OutputSink>,
}

/// Read half for one subprocess output stream (stdout or stderr).
pub struct ReadHalf<R: AsyncRead + Unpin + Send> {
    stream: StreamKind,
    reader: R,
}

impl<R: AsyncRead + Unpin + Send + 'static> ReadHalf<R> {
    /// Create a new read half from an AsyncRead.
    ///
    /// # Arguments
    ///
    /// * `stream` - Which of the child's streams `reader` is attached to
    /// * `reader` - Typically `ChildStdout` or `ChildStderr`
    pub fn new(stream: StreamKind, reader: R) -> Self {
        Self { stream, reader }
    }

    pub fn stream(&self) -> StreamKind {
        self.stream
    }

    /// Consume self and spawn a task that reads the stream to EOF.
    ///
    /// Every line is appended to the capture buffer and, when echo is on,
    /// handed to the sink, in arrival order. A read error is reported to the
    /// sink and ends the task; lines read before it are kept. The buffer is
    /// returned through the task's `JoinHandle`.
    pub fn drain(self, config: DrainConfig) -> JoinHandle<CaptureBuffer> {
        tokio::spawn(drain_stream(self.stream, self.reader, config))
    }

    /// Consume self and return a channel that yields the stream's lines.
    ///
    /// Lines are decoded and split the same way [`drain`](Self::drain) does,
    /// but nothing is captured or echoed. The background task runs until EOF,
    /// a read error (sent as the last item) or until the receiver is dropped.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use cmdtee_sdk::internal::transport::ReadHalf;
    /// # use tokio::process::ChildStdout;
    /// # async fn example(stdout: ReadHalf<ChildStdout>) {
    /// let mut lines = stdout.read_lines(None);
    /// while let Some(Ok(line)) = lines.recv().await {
    ///     println!("{line}");
    /// }
    /// # }
    /// ```
    pub fn read_lines(
        self,
        encoding: Option<&'static Encoding>,
    ) -> mpsc::Receiver<std::result::Result<String, StreamReadError>> {
        let (tx, rx) = mpsc::channel(LINE_CHANNEL_CAPACITY);
        tokio::spawn(forward_lines(self.stream, self.reader, encoding, tx));
        rx
    }

    /// Unwrap the raw pipe.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

async fn drain_stream<R: AsyncRead + Unpin>(
    stream: StreamKind,
    mut reader: R,
    config: DrainConfig,
) -> CaptureBuffer {
    let mut capture = CaptureBuffer::new();
    let mut decoder = LineDecoder::new(config.encoding);
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for line in decoder.feed(&chunk[..n]) {
                    record(stream, &config, &mut capture, line).await;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                let error = StreamReadError { stream, source };
                config.sink.stream_error(&error).await;
                break;
            }
        }
    }

    for line in decoder.finish() {
        record(stream, &config, &mut capture, line).await;
    }

    debug!(stream = %stream, lines = capture.len(), "Stream drained");
    capture
}

async fn forward_lines<R: AsyncRead + Unpin>(
    stream: StreamKind,
    mut reader: R,
    encoding: Option<&'static Encoding>,
    tx: mpsc::Sender<std::result::Result<String, StreamReadError>>,
) {
    let mut decoder = LineDecoder::new(encoding);
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    let failure = loop {
        let lines = match reader.read(&mut chunk).await {
            Ok(0) => break None,
            Ok(n) => decoder.feed(&chunk[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => break Some(StreamReadError { stream, source }),
        };
        for line in lines {
            if tx.send(Ok(line)).await.is_err() {
                debug!(stream = %stream, "Line receiver dropped");
                return;
            }
        }
    };

    for line in decoder.finish() {
        if tx.send(Ok(line)).await.is_err() {
            return;
        }
    }
    if let Some(error) = failure {
        let _ = tx.send(Err(error)).await;
    }
}

async fn record(stream: StreamKind, config: &DrainConfig, capture: &mut CaptureBuffer, line: String) {
    trace!(stream = %stream, line = %line, "Captured line");
    if config.echo {
        config.sink.echo(stream, &line).await;
    }
    capture.push(line);
}
