//! Error types for wizard-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// No action with this ID in the catalog
    #[error("action not found: {0}")]
    ActionNotFound(String),

    /// Action exists but has nothing to run
    #[error("action has no script to execute: {0}")]
    EmptyScript(String),

    /// Invalid configuration or catalog
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Process could not be started
    #[error("runner error: {0}")]
    Runner(#[from] wizard_runner::Error),

    /// Graceful shutdown failed
    #[error("shutdown error: {0}")]
    Shutdown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether the error was caused by the caller's request rather than the host
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::ActionNotFound(_) | Error::EmptyScript(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::ActionNotFound("missing-id".to_string());
        assert_eq!(err.to_string(), "action not found: missing-id");

        let err = Error::Runner(wizard_runner::Error::PtyOpen("no devices".to_string()));
        assert_eq!(err.to_string(), "runner error: failed to open pty: no devices");
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::ActionNotFound("x".into()).is_client_error());
        assert!(Error::EmptyScript("x".into()).is_client_error());
        assert!(!Error::Configuration("x".into()).is_client_error());
        assert!(!Error::Shutdown("x".into()).is_client_error());
    }
}
