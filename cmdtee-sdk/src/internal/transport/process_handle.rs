//! Process handle for managing subprocess lifecycle.

use std::process::ExitStatus;

use crate::types::{ExitError, Result};
use tokio::process::Child;
use tracing::warn;

/// Handle for managing a subprocess.
///
/// Provides methods to control the subprocess lifecycle (kill, wait, etc.)
/// without exposing the underlying Child object. The child's pipes have
/// already been taken by the time a handle exists.
pub struct ProcessHandle {
    child: Child,
}

impl ProcessHandle {
    /// Create a new process handle from a Child process.
    pub fn new(child: Child) -> Self {
        Self { child }
    }

    /// Terminate the process.
    pub async fn kill(&mut self) -> Result<()> {
        self.child.kill().await?;
        Ok(())
    }

    /// Wait for the process and classify how it ended.
    ///
    /// Returns `None` for a successful exit, `ExitError::Status` for any
    /// other status, and `ExitError::Wait` when no status could be obtained.
    pub async fn termination(&mut self) -> Option<ExitError> {
        match self.child.wait().await {
            Ok(status) if status.success() => None,
            Ok(status) => Some(ExitError::Status(status)),
            Err(e) => {
                warn!(error = %e, "Failed to wait for process");
                Some(ExitError::Wait(e))
            }
        }
    }

    /// Check if the process has exited without blocking.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        Ok(self.child.try_wait()?)
    }

    /// Get the process ID.
    ///
    /// Returns `None` once the process has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}
