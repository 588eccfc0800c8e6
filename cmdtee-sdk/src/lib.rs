//! cmdtee SDK - run external commands, capture their output and echo it live.
//!
//! A child's stdout and stderr are drained by two concurrent tasks, each
//! optionally transcoding the byte stream (e.g. Shift_JIS to UTF-8) before
//! splitting it into lines. Every line is stored in a capture buffer and, if
//! requested, echoed to the console as it arrives. The process is reaped only
//! after both streams reach EOF.
//!
//! # Example
//!
//! ```rust,no_run
//! use cmdtee_sdk::{Cmd, CmdOptions};
//!
//! # async fn example() -> cmdtee_sdk::Result<()> {
//! let options = CmdOptions::new()
//!     .with_echo(true)
//!     .with_stdout_encoding(encoding_rs::SHIFT_JIS);
//!
//! let output = Cmd::new("legacy-tool", ["--report"], options).run().await?;
//! println!("exit code {}", output.exit_code());
//! for line in output.stdout_lines() {
//!     println!("captured: {line}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`types`] - Errors, options, output and the output sink trait
//! - [`internal`] - Process plumbing (spawn, stream halves, process handle)
//! - [`cmd`] - The command runner
//! - [`util`] - Command-line, glob, regex and path helpers

pub mod cmd;
pub mod internal;
pub mod types;
pub mod util;

// Re-export all public types at the crate root for convenience
pub use cmd::{Cmd, RunningCmd};
pub use types::*;
