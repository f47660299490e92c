//! Error types for wizard-runner

use std::process::ExitStatus;
use thiserror::Error;

/// Runner error type
///
/// Every variant is a spawn-time failure. Once a process is running, I/O
/// failures end the session instead of surfacing here.
#[derive(Debug, Error)]
pub enum Error {
    /// Temporary script file could not be created or written
    #[error("failed to persist script: {0}")]
    TempFile(#[source] std::io::Error),

    /// Temporary script file could not be made executable
    #[error("failed to make script executable: {0}")]
    Permissions(#[source] std::io::Error),

    /// Terminal emulator could not be started
    #[error("failed to launch terminal '{program}': {source}")]
    TerminalLaunch {
        /// Terminal program that was invoked
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// Terminal session ended unsuccessfully
    #[error("terminal exited with {0}")]
    TerminalExit(ExitStatus),

    /// Pseudo-terminal pair could not be allocated
    #[error("failed to open pty: {0}")]
    PtyOpen(String),

    /// Interpreter could not be started on the pty
    #[error("failed to spawn '{shell}': {message}")]
    Spawn {
        /// Interpreter that was invoked
        shell: String,
        /// Error message
        message: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
