//! Options controlling how a command is run and observed.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use encoding_rs::Encoding;

use crate::types::{ConsoleSink, OutputSink, StreamKind};

/// Configuration for a single command invocation.
///
/// # Example
///
/// ```rust
/// use cmdtee_sdk::CmdOptions;
///
/// let options = CmdOptions::new()
///     .with_echo_stdout(true)
///     .with_stderr_encoding(encoding_rs::SHIFT_JIS)
///     .with_cwd("/tmp");
/// assert!(options.echo_stdout);
/// ```
#[derive(Clone)]
pub struct CmdOptions {
    /// Decoder for stdout; `None` passes bytes through as UTF-8.
    pub stdout_encoding: Option<&'static Encoding>,
    /// Decoder for stderr; `None` passes bytes through as UTF-8.
    pub stderr_encoding: Option<&'static Encoding>,
    /// Echo each stdout line to the sink as it arrives.
    pub echo_stdout: bool,
    /// Echo each stderr line to the sink as it arrives.
    pub echo_stderr: bool,
    /// Working directory for the child.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables for the child.
    pub env: HashMap<String, String>,
    /// Kill the child if its handle is dropped before it exits.
    pub kill_on_drop: bool,
    /// Give the child a stdin pipe; otherwise it reads from the null device.
    pub pipe_stdin: bool,
    /// Hand stdout to the caller through `RunningCmd::take_stdout` instead
    /// of draining it.
    pub take_stdout: bool,
    /// Hand stderr to the caller through `RunningCmd::take_stderr` instead
    /// of draining it.
    pub take_stderr: bool,
    /// Receives echoed lines and non-fatal stream errors.
    pub sink: Arc<dyn OutputSink>,
}

impl CmdOptions {
    pub fn new() -> Self {
        Self {
            stdout_encoding: None,
            stderr_encoding: None,
            echo_stdout: false,
            echo_stderr: false,
            cwd: None,
            env: HashMap::new(),
            kill_on_drop: false,
            pipe_stdin: false,
            take_stdout: false,
            take_stderr: false,
            sink: Arc::new(ConsoleSink),
        }
    }

    pub fn with_stdout_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.stdout_encoding = Some(encoding);
        self
    }

    pub fn with_stderr_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.stderr_encoding = Some(encoding);
        self
    }

    pub fn with_echo_stdout(mut self, echo: bool) -> Self {
        self.echo_stdout = echo;
        self
    }

    pub fn with_echo_stderr(mut self, echo: bool) -> Self {
        self.echo_stderr = echo;
        self
    }

    /// Echo both streams.
    pub fn with_echo(self, echo: bool) -> Self {
        self.with_echo_stdout(echo).with_echo_stderr(echo)
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_kill_on_drop(mut self, kill_on_drop: bool) -> Self {
        self.kill_on_drop = kill_on_drop;
        self
    }

    pub fn with_pipe_stdin(mut self, pipe_stdin: bool) -> Self {
        self.pipe_stdin = pipe_stdin;
        self
    }

    pub fn with_take_stdout(mut self, take: bool) -> Self {
        self.take_stdout = take;
        self
    }

    pub fn with_take_stderr(mut self, take: bool) -> Self {
        self.take_stderr = take;
        self
    }

    /// Replace the default console sink.
    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = sink;
        self
    }

    pub(crate) fn encoding_for(&self, stream: StreamKind) -> Option<&'static Encoding> {
        match stream {
            StreamKind::Stdout => self.stdout_encoding,
            StreamKind::Stderr => self.stderr_encoding,
        }
    }

    pub(crate) fn takes(&self, stream: StreamKind) -> bool {
        match stream {
            StreamKind::Stdout => self.take_stdout,
            StreamKind::Stderr => self.take_stderr,
        }
    }

    pub(crate) fn echo_for(&self, stream: StreamKind) -> bool {
        match stream {
            StreamKind::Stdout => self.echo_stdout,
            StreamKind::Stderr => self.echo_stderr,
        }
    }
}

impl Default for CmdOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CmdOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CmdOptions")
            .field("stdout_encoding", &self.stdout_encoding.map(Encoding::name))
            .field("stderr_encoding", &self.stderr_encoding.map(Encoding::name))
            .field("echo_stdout", &self.echo_stdout)
            .field("echo_stderr", &self.echo_stderr)
            .field("cwd", &self.cwd)
            .field("env", &self.env)
            .field("kill_on_drop", &self.kill_on_drop)
            .field("pipe_stdin", &self.pipe_stdin)
            .field("take_stdout", &self.take_stdout)
            .field("take_stderr", &self.take_stderr)
            .finish_non_exhaustive()
    }
}
