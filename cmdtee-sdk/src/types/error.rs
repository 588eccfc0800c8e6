//! Error types for cmdtee.

use std::io;

use thiserror::Error;

use crate::types::StreamKind;

/// Exit code reported for a process that never produced an OS-level status.
pub const GENERIC_FAILURE_EXIT_CODE: i32 = 1;

/// Errors raised while building or starting a command.
///
/// A nonzero exit is not an error: it is reported through
/// [`CmdOutput::exit_code`](crate::CmdOutput::exit_code).
#[derive(Error, Debug)]
pub enum Error {
    /// The command line could not be tokenized.
    #[error("Malformed command line: {0}")]
    MalformedCommandLine(String),

    /// The executable could not be found on the search path.
    #[error("Executable not found: {name}")]
    ExecutableNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    /// A standard stream pipe was not available after spawn.
    #[error("Failed to set up {pipe} pipe")]
    PipeSetupFailed { pipe: &'static str },

    /// The OS refused to create the process.
    #[error("Failed to spawn '{program}': {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A regex fragment failed to compile.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// A glob pattern was malformed.
    #[error("Invalid glob pattern: {0}")]
    InvalidGlob(#[from] glob::PatternError),

    /// No encoding is registered under the given label.
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Exit code to report when this error prevented the process from running.
    ///
    /// Returns `None` for errors unrelated to starting a process.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Error::ExecutableNotFound { .. }
            | Error::SpawnFailed { .. }
            | Error::PipeSetupFailed { .. } => Some(GENERIC_FAILURE_EXIT_CODE),
            _ => None,
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-EOF failure while draining one of the child's output streams.
///
/// Never propagated to the caller; it is handed to the
/// [`OutputSink`](crate::OutputSink) and draining of that stream stops.
#[derive(Error, Debug)]
#[error("Failed to read {stream}: {source}")]
pub struct StreamReadError {
    pub stream: StreamKind,
    #[source]
    pub source: io::Error,
}
