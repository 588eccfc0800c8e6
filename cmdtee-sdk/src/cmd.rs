//! Command runner that captures and echoes a child's output.

use tokio::io::AsyncRead;
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::internal::transport::{DrainConfig, ProcessHandle, ReadHalf, Subprocess, WriteHalf};
use crate::types::{CaptureBuffer, CmdOptions, CmdOutput, Result, StreamKind};
use crate::util::{join_command_line, split_command_line};

/// A command that has not been started yet.
///
/// Running a command goes through three types, one per lifecycle stage:
/// [`Cmd`] is consumed by [`start`](Cmd::start) into a [`RunningCmd`], which
/// is consumed by [`wait`](RunningCmd::wait) into a [`CmdOutput`]. A command
/// therefore runs at most once, and its output cannot be read before both
/// streams are drained and the process is reaped.
///
/// # Example
///
/// ```rust,no_run
/// use cmdtee_sdk::{Cmd, CmdOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let options = CmdOptions::new().with_echo(true);
///     let output = Cmd::from_command_line("git status --short", options)?
///         .run()
///         .await?;
///
///     if output.exit_code() != 0 {
///         eprintln!("git failed:\n{}", output.stderr());
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
    command_line: Option<String>,
    options: CmdOptions,
}

impl Cmd {
    /// Create a command from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I, options: CmdOptions) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            command_line: None,
            options,
        }
    }

    /// Create a command by tokenizing a shell-style command line.
    ///
    /// # Errors
    /// Returns `MalformedCommandLine` for unbalanced quotes or an empty line.
    pub fn from_command_line(line: &str, options: CmdOptions) -> Result<Self> {
        let mut words = split_command_line(line)?.into_iter();
        // split_command_line never returns an empty list
        let program = words.next().unwrap_or_default();

        Ok(Self {
            program,
            args: words.collect(),
            command_line: Some(line.to_string()),
            options,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> &CmdOptions {
        &self.options
    }

    /// The original command line, or one rebuilt from program and arguments.
    pub fn command_line(&self) -> String {
        match self.command_line {
            Some(ref line) => line.clone(),
            None => join_command_line(std::iter::once(&self.program).chain(&self.args)),
        }
    }

    /// Spawn the process and start draining its stdout and stderr.
    ///
    /// One drain task is started per output stream, except for streams the
    /// options hand to the caller (`take_stdout` / `take_stderr`); those are
    /// left for [`RunningCmd::take_stdout`] and [`RunningCmd::take_stderr`].
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// `ExecutableNotFound`, `SpawnFailed` or `PipeSetupFailed`. In all three
    /// cases no drain task was started and [`Error::exit_code`] gives the
    /// exit code to report.
    ///
    /// [`Error::exit_code`]: crate::Error::exit_code
    pub async fn start(self) -> Result<RunningCmd> {
        let command_line = self.command_line();
        let (stdout, stderr, stdin, process) =
            Subprocess::new(&self.program, &self.args, &self.options)
                .spawn()
                .await
                .inspect_err(|e| error!(command = %command_line, error = %e, "Failed to start command"))?;

        let (stdout, stdout_task) = self.attach(stdout);
        let (stderr, stderr_task) = self.attach(stderr);

        Ok(RunningCmd {
            command_line,
            stdin,
            stdout,
            stderr,
            process,
            stdout_task,
            stderr_task,
        })
    }

    /// Start the command and wait for it to finish.
    ///
    /// Start-time errors are returned; a nonzero exit is not an error and is
    /// reported through [`CmdOutput::exit_code`].
    pub async fn run(self) -> Result<CmdOutput> {
        let running = self.start().await?;
        Ok(running.wait().await)
    }

    /// Start draining `half`, or keep it for the caller.
    fn attach<R>(&self, half: ReadHalf<R>) -> (Option<ReadHalf<R>>, Option<JoinHandle<CaptureBuffer>>)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let stream = half.stream();
        if self.options.takes(stream) {
            debug!(stream = %stream, "Stream left to the caller");
            (Some(half), None)
        } else {
            (None, Some(half.drain(self.drain_config(stream))))
        }
    }

    fn drain_config(&self, stream: StreamKind) -> DrainConfig {
        DrainConfig {
            encoding: self.options.encoding_for(stream),
            echo: self.options.echo_for(stream),
            sink: self.options.sink.clone(),
        }
    }
}

/// A started command whose output is being drained.
pub struct RunningCmd {
    command_line: String,
    stdin: Option<WriteHalf<ChildStdin>>,
    stdout: Option<ReadHalf<ChildStdout>>,
    stderr: Option<ReadHalf<ChildStderr>>,
    process: ProcessHandle,
    stdout_task: Option<JoinHandle<CaptureBuffer>>,
    stderr_task: Option<JoinHandle<CaptureBuffer>>,
}

impl RunningCmd {
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    /// Get the process ID, `None` once the process has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.process.id()
    }

    /// Take the child's stdin (can only be called once).
    ///
    /// Returns `None` unless the command was started with `pipe_stdin`;
    /// without it the child reads from the null device. The runner never
    /// writes to or closes a piped stdin. A child that reads its input to EOF
    /// will not exit until the returned half is closed or dropped. If stdin
    /// is never taken, it is dropped when [`wait`] starts.
    ///
    /// [`wait`]: RunningCmd::wait
    pub fn take_stdin(&mut self) -> Option<WriteHalf<ChildStdin>> {
        self.stdin.take()
    }

    /// Take the child's stdout (can only be called once).
    ///
    /// Returns `None` unless the command was started with `take_stdout`, in
    /// which case the stream is not drained, echoed or captured. Read it with
    /// [`ReadHalf::read_lines`] or [`ReadHalf::into_inner`]. A half that is
    /// still here when [`wait`] starts is dropped, closing the read end.
    ///
    /// [`wait`]: RunningCmd::wait
    pub fn take_stdout(&mut self) -> Option<ReadHalf<ChildStdout>> {
        self.stdout.take()
    }

    /// Take the child's stderr; see [`take_stdout`](Self::take_stdout).
    pub fn take_stderr(&mut self) -> Option<ReadHalf<ChildStderr>> {
        self.stderr.take()
    }

    /// Terminate the process. `wait` still collects whatever was captured.
    pub async fn kill(&mut self) -> Result<()> {
        self.process.kill().await
    }

    /// Check if the process has exited without blocking.
    pub fn try_wait(&mut self) -> Result<Option<std::process::ExitStatus>> {
        self.process.try_wait()
    }

    /// Wait for both streams to reach EOF, then for the process to exit.
    ///
    /// The process is only reaped after the drain tasks have finished, so
    /// output still buffered in the pipes is never lost. A stream handed to
    /// the caller has no drain task and an empty capture buffer.
    pub async fn wait(mut self) -> CmdOutput {
        drop(self.stdin.take());
        drop(self.stdout.take());
        drop(self.stderr.take());

        let (stdout, stderr) = tokio::join!(
            joined(StreamKind::Stdout, self.stdout_task),
            joined(StreamKind::Stderr, self.stderr_task)
        );
        debug!(
            command = %self.command_line,
            stdout_lines = stdout.len(),
            stderr_lines = stderr.len(),
            "Output streams drained"
        );

        let exit_error = self.process.termination().await;

        let output = CmdOutput {
            command_line: self.command_line,
            stdout,
            stderr,
            exit_error,
        };
        info!(command = %output.command_line, exit_code = output.exit_code(), "Command finished");
        output
    }
}

async fn joined(stream: StreamKind, task: Option<JoinHandle<CaptureBuffer>>) -> CaptureBuffer {
    let Some(task) = task else {
        return CaptureBuffer::new();
    };

    match task.await {
        Ok(capture) => capture,
        Err(e) => {
            error!(stream = %stream, error = %e, "Drain task failed");
            CaptureBuffer::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Error;

    #[test]
    fn test_command_line_from_vector() {
        let cmd = Cmd::new("echo", ["hello world", "x"], CmdOptions::new());
        assert_eq!(cmd.command_line(), "echo 'hello world' x");
    }

    #[test]
    fn test_command_line_is_kept_verbatim() {
        let cmd = Cmd::from_command_line("echo   \"hello world\"", CmdOptions::new()).unwrap();
        assert_eq!(cmd.program(), "echo");
        assert_eq!(cmd.args(), ["hello world"]);
        assert_eq!(cmd.command_line(), "echo   \"hello world\"");
    }

    #[test]
    fn test_malformed_command_line() {
        let result = Cmd::from_command_line("echo 'oops", CmdOptions::new());
        assert!(matches!(result, Err(Error::MalformedCommandLine(_))));
    }

    #[tokio::test]
    async fn test_start_missing_executable() {
        let cmd = Cmd::new("cmdtee-missing-binary", Vec::<String>::new(), CmdOptions::new());
        match cmd.start().await {
            Err(e) => assert_eq!(e.exit_code(), Some(1)),
            Ok(_) => panic!("Expected start to fail"),
        }
    }
}
