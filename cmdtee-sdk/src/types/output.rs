//! Finalized result of a command invocation.

use std::io;
use std::process::ExitStatus;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::types::GENERIC_FAILURE_EXIT_CODE;

/// Lines captured from one output stream, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CaptureBuffer {
    lines: Vec<String>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The captured text, each line followed by `\n`.
    pub fn text(&self) -> String {
        let size = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut text = String::with_capacity(size);
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Why a process did not terminate cleanly.
#[derive(Debug)]
pub enum ExitError {
    /// The process exited with a non-success status.
    Status(ExitStatus),
    /// Waiting on the process failed, so no status is available.
    Wait(io::Error),
}

impl ExitError {
    pub fn status(&self) -> Option<ExitStatus> {
        match self {
            ExitError::Status(status) => Some(*status),
            ExitError::Wait(_) => None,
        }
    }
}

impl std::fmt::Display for ExitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitError::Status(status) => write!(f, "process {}", status),
            ExitError::Wait(e) => write!(f, "failed to wait for process: {}", e),
        }
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExitError::Status(_) => None,
            ExitError::Wait(e) => Some(e),
        }
    }
}

/// Normalize a termination error into an exit code.
///
/// - no error: `0`
/// - a status carrying an exit code: that code
/// - on Unix, a status ended by a signal: `128 + signal`
/// - anything else: [`GENERIC_FAILURE_EXIT_CODE`]
pub fn derive_exit_code(error: Option<&ExitError>) -> i32 {
    let Some(error) = error else {
        return 0;
    };

    match error.status() {
        Some(status) => status_code(status),
        None => GENERIC_FAILURE_EXIT_CODE,
    }
}

fn status_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    GENERIC_FAILURE_EXIT_CODE
}

/// Everything a finished command left behind.
///
/// Produced by [`RunningCmd::wait`](crate::RunningCmd::wait) once both output
/// streams reached EOF and the process was reaped.
#[derive(Debug)]
pub struct CmdOutput {
    pub(crate) command_line: String,
    pub(crate) stdout: CaptureBuffer,
    pub(crate) stderr: CaptureBuffer,
    pub(crate) exit_error: Option<ExitError>,
}

impl CmdOutput {
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Captured stdout text.
    pub fn stdout(&self) -> String {
        self.stdout.text()
    }

    /// Captured stderr text.
    pub fn stderr(&self) -> String {
        self.stderr.text()
    }

    pub fn stdout_lines(&self) -> &[String] {
        self.stdout.lines()
    }

    pub fn stderr_lines(&self) -> &[String] {
        self.stderr.lines()
    }

    pub fn stdout_buffer(&self) -> &CaptureBuffer {
        &self.stdout
    }

    pub fn stderr_buffer(&self) -> &CaptureBuffer {
        &self.stderr
    }

    /// Termination error, `None` on a clean exit.
    pub fn exit_error(&self) -> Option<&ExitError> {
        self.exit_error.as_ref()
    }

    pub fn exit_code(&self) -> i32 {
        derive_exit_code(self.exit_error.as_ref())
    }

    pub fn success(&self) -> bool {
        self.exit_error.is_none()
    }
}

impl Serialize for CmdOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CmdOutput", 5)?;
        state.serialize_field("command_line", &self.command_line)?;
        state.serialize_field("exit_code", &self.exit_code())?;
        state.serialize_field(
            "exit_error",
            &self.exit_error.as_ref().map(|e| e.to_string()),
        )?;
        state.serialize_field("stdout", &self.stdout)?;
        state.serialize_field("stderr", &self.stderr)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(lines: &[&str]) -> CaptureBuffer {
        let mut buf = CaptureBuffer::new();
        for line in lines {
            buf.push(line.to_string());
        }
        buf
    }

    #[test]
    fn test_capture_text_terminates_every_line() {
        assert_eq!(buffer(&["a", "", "b"]).text(), "a\n\nb\n");
        assert_eq!(CaptureBuffer::new().text(), "");
    }

    #[test]
    fn test_exit_code_without_error_is_zero() {
        assert_eq!(derive_exit_code(None), 0);
    }

    #[test]
    fn test_exit_code_without_status_is_generic_failure() {
        let err = ExitError::Wait(io::Error::new(io::ErrorKind::Other, "lost child"));
        assert_eq!(derive_exit_code(Some(&err)), GENERIC_FAILURE_EXIT_CODE);
        assert_eq!(derive_exit_code(Some(&err)), derive_exit_code(Some(&err)));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_from_raw_status() {
        use std::os::unix::process::ExitStatusExt;

        // wait(2) encoding: exit code in the high byte, signal in the low bits.
        let exited = ExitError::Status(ExitStatus::from_raw(3 << 8));
        assert_eq!(derive_exit_code(Some(&exited)), 3);

        let killed = ExitError::Status(ExitStatus::from_raw(9));
        assert_eq!(derive_exit_code(Some(&killed)), 137);
    }

    #[test]
    fn test_output_serializes_summary() {
        let output = CmdOutput {
            command_line: "echo hi".to_string(),
            stdout: buffer(&["hi"]),
            stderr: CaptureBuffer::new(),
            exit_error: None,
        };

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["command_line"], "echo hi");
        assert_eq!(json["exit_code"], 0);
        assert!(json["exit_error"].is_null());
        assert_eq!(json["stdout"][0], "hi");
        assert_eq!(json["stderr"].as_array().unwrap().len(), 0);
    }
}
