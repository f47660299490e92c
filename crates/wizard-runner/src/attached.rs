//! Attached execution: run a script on a pseudo-terminal
//!
//! The interpreter is started with the PTY slave as its controlling terminal
//! so interactive and full-screen programs behave as they would in a real
//! terminal. The master side is kept for [`crate::bridge`].

use crate::config::RunnerConfig;
use crate::error::{Error, Result};
use tracing::{debug, info};

/// A running interpreter together with the master side of its PTY.
///
/// Dropping it kills the interpreter if it is still running.
pub struct AttachedProcess {
    pub(crate) child: tokio::process::Child,
    pub(crate) pty: pty_process::Pty,
}

impl AttachedProcess {
    /// OS process id, if the process has not been reaped yet
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

impl std::fmt::Debug for AttachedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttachedProcess")
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

/// Starts scripts attached to a fresh PTY.
#[derive(Debug, Clone)]
pub struct AttachedRunner {
    config: RunnerConfig,
}

impl AttachedRunner {
    /// Create a runner with the given configuration
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Read buffer size used when bridging this runner's processes
    #[must_use]
    pub fn read_buffer_size(&self) -> usize {
        self.config.read_buffer_size
    }

    /// Allocate a PTY and start `<shell> -c <script>` on it.
    ///
    /// Must be called from within a tokio runtime. On failure no process is
    /// left running.
    pub fn spawn(&self, script: &str) -> Result<AttachedProcess> {
        let (pty, pts) = pty_process::open().map_err(|e| Error::PtyOpen(e.to_string()))?;

        let shell = &self.config.shell;
        let child = pty_process::Command::new(shell)
            .args(["-c", script])
            .env("TERM", &self.config.term)
            .kill_on_drop(true)
            .spawn(pts)
            .map_err(|e| Error::Spawn {
                shell: shell.clone(),
                message: e.to_string(),
            })?;

        match child.id() {
            Some(pid) => info!(pid, shell = %shell, "Started attached process"),
            None => debug!(shell = %shell, "Attached process exited immediately"),
        }

        Ok(AttachedProcess { child, pty })
    }
}
