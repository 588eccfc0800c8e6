//! Subprocess spawning with the standard streams piped.

use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use super::{ProcessHandle, ReadHalf, WriteHalf};
use crate::types::{CmdOptions, Error, Result, StreamKind};
use crate::util::resolve_executable_path_in;

/// Type alias for the split subprocess components
///
/// The stdin half is `None` unless `CmdOptions::pipe_stdin` is set.
pub type SplitSubprocess = (
    ReadHalf<ChildStdout>,
    ReadHalf<ChildStderr>,
    Option<WriteHalf<ChildStdin>>,
    ProcessHandle,
);

/// A process that is ready to be spawned.
pub struct Subprocess<'a> {
    program: &'a str,
    args: &'a [String],
    options: &'a CmdOptions,
}

impl<'a> Subprocess<'a> {
    pub fn new(program: &'a str, args: &'a [String], options: &'a CmdOptions) -> Self {
        Self {
            program,
            args,
            options,
        }
    }

    /// Build the OS command for `path`.
    ///
    /// The standard streams are configured here, before anything is
    /// spawned. Stdin is only a pipe when asked for; otherwise the child
    /// sees EOF on its first read.
    fn build_command(&self, path: &Path) -> Command {
        let mut command = Command::new(path);
        command.args(self.args);

        // Set up stdio
        if self.options.pipe_stdin {
            command.stdin(Stdio::piped());
        } else {
            command.stdin(Stdio::null());
        }
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());

        if let Some(ref cwd) = self.options.cwd {
            command.current_dir(cwd);
        }
        for (key, value) in &self.options.env {
            command.env(key, value);
        }
        command.kill_on_drop(self.options.kill_on_drop);

        command
    }

    /// Spawn the process and split it into its stream halves and handle.
    ///
    /// # Errors
    ///
    /// - `ExecutableNotFound` if the program cannot be resolved (relative
    ///   paths are resolved against the configured working directory)
    /// - `SpawnFailed` if the OS refuses to create the process
    /// - `PipeSetupFailed` if a pipe is missing after spawn; the child is
    ///   killed and reaped before returning
    pub async fn spawn(self) -> Result<SplitSubprocess> {
        let path = resolve_executable_path_in(self.program, self.options.cwd.as_deref())?;
        debug!(program = %path.display(), args = ?self.args, "Spawning process");

        let mut child = self
            .build_command(&path)
            .spawn()
            .map_err(|source| Error::SpawnFailed {
                program: self.program.to_string(),
                source,
            })?;

        let stdin = child.stdin.take();
        if self.options.pipe_stdin && stdin.is_none() {
            return Err(abandon(child, "stdin").await);
        }
        let Some(stdout) = child.stdout.take() else {
            return Err(abandon(child, "stdout").await);
        };
        let Some(stderr) = child.stderr.take() else {
            return Err(abandon(child, "stderr").await);
        };

        info!(program = %path.display(), pid = ?child.id(), "Process started");

        Ok((
            ReadHalf::new(StreamKind::Stdout, stdout),
            ReadHalf::new(StreamKind::Stderr, stderr),
            stdin.map(WriteHalf::new),
            ProcessHandle::new(child),
        ))
    }
}

/// Kill a child whose `pipe` could not be taken.
async fn abandon(mut child: Child, pipe: &'static str) -> Error {
    if let Err(e) = child.kill().await {
        warn!(error = %e, "Failed to kill half-started process");
    }
    Error::PipeSetupFailed { pipe }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_missing_executable() {
        let options = CmdOptions::new();
        let result = Subprocess::new("cmdtee-definitely-not-installed", &[], &options)
            .spawn()
            .await;

        match result {
            Err(Error::ExecutableNotFound { name, .. }) => {
                assert_eq!(name, "cmdtee-definitely-not-installed");
            }
            Err(other) => panic!("Expected ExecutableNotFound, got {other}"),
            Ok(_) => panic!("Expected ExecutableNotFound, got a process"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_splits_into_halves() {
        let options = CmdOptions::new();
        let args = vec!["-c".to_string(), "exit 0".to_string()];
        let (stdout, stderr, stdin, mut handle) = Subprocess::new("sh", &args, &options)
            .spawn()
            .await
            .unwrap();

        assert_eq!(stdout.stream(), StreamKind::Stdout);
        assert_eq!(stderr.stream(), StreamKind::Stderr);
        assert!(stdin.is_none());
        assert!(handle.termination().await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_spawn_pipes_stdin_on_request() {
        let options = CmdOptions::new().with_pipe_stdin(true);
        let args = vec!["-c".to_string(), "exit 0".to_string()];
        let (_stdout, _stderr, stdin, mut handle) = Subprocess::new("sh", &args, &options)
            .spawn()
            .await
            .unwrap();

        assert!(stdin.is_some());
        drop(stdin);
        assert!(handle.termination().await.is_none());
    }
}
