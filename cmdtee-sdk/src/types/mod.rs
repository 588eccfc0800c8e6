//! Type definitions for cmdtee.

pub mod error;
pub mod options;
pub mod output;
pub mod sink;
pub mod stream;

// Re-export commonly used types
pub use error::{Error, GENERIC_FAILURE_EXIT_CODE, Result, StreamReadError};
pub use options::CmdOptions;
pub use output::{CaptureBuffer, CmdOutput, ExitError, derive_exit_code};
pub use sink::{ConsoleSink, OutputSink};
pub use stream::StreamKind;
