//! Graceful Shutdown
//!
//! Coordinates stopping the HTTP server, either on an OS signal or when the
//! heartbeat supervisor decides the client is gone.
//!
//! ## Usage
//!
//! ```ignore
//! let shutdown = ShutdownController::new();
//!
//! // Hand tokens to background loops
//! let token = shutdown.token();
//! supervisor.run(token, shutdown.as_ref()).await;
//!
//! // Stop serving once the controller fires
//! axum::serve(listener, app)
//!     .with_graceful_shutdown(shutdown.clone().wait())
//!     .await?;
//! ```

use crate::error::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Shutdown phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    /// Normal operation
    Running,
    /// Shutdown requested, server draining connections
    Stopping,
    /// Shutdown complete
    Terminated,
}

impl std::fmt::Display for ShutdownPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Stopping => write!(f, "Stopping"),
            Self::Terminated => write!(f, "Terminated"),
        }
    }
}

/// Something that can stop the whole process gracefully.
#[async_trait]
pub trait ShutdownTrigger: Send + Sync {
    /// Begin graceful shutdown
    async fn trigger(&self) -> Result<()>;
}

/// Shutdown controller for coordinating graceful shutdown
pub struct ShutdownController {
    /// Cancellation token for all components
    cancel_token: CancellationToken,
    /// Current shutdown phase
    phase: AtomicU32,
    /// Whether shutdown has been initiated
    shutdown_initiated: AtomicBool,
}

impl ShutdownController {
    /// Create a new shutdown controller
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            cancel_token: CancellationToken::new(),
            phase: AtomicU32::new(ShutdownPhase::Running as u32),
            shutdown_initiated: AtomicBool::new(false),
        })
    }

    /// Get a cancellation token for a component
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }

    /// Get current shutdown phase
    #[must_use]
    pub fn phase(&self) -> ShutdownPhase {
        match self.phase.load(Ordering::SeqCst) {
            0 => ShutdownPhase::Running,
            1 => ShutdownPhase::Stopping,
            _ => ShutdownPhase::Terminated,
        }
    }

    /// Check if shutdown has been initiated
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_initiated.load(Ordering::SeqCst)
    }

    fn set_phase(&self, phase: ShutdownPhase) {
        self.phase.store(phase as u32, Ordering::SeqCst);
        info!(phase = %phase, "Shutdown phase changed");
    }

    /// Initiate graceful shutdown. Only the first call has an effect.
    pub fn shutdown(&self) {
        if self
            .shutdown_initiated
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Shutdown already initiated");
            return;
        }

        info!("Initiating graceful shutdown...");
        self.set_phase(ShutdownPhase::Stopping);
        self.cancel_token.cancel();
    }

    /// Mark shutdown as finished once the server has stopped
    pub fn complete(&self) {
        self.set_phase(ShutdownPhase::Terminated);
    }

    /// Resolve once shutdown has been initiated
    pub async fn wait(self: Arc<Self>) {
        self.cancel_token.cancelled().await;
    }
}

#[async_trait]
impl ShutdownTrigger for ShutdownController {
    async fn trigger(&self) -> Result<()> {
        self.shutdown();
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
pub async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}

/// Trigger the controller when the process receives a shutdown signal
pub async fn shutdown_on_signal(controller: Arc<ShutdownController>) {
    let cancelled = controller.cancel_token.clone();
    tokio::select! {
        _ = wait_for_shutdown_signal() => controller.shutdown(),
        _ = cancelled.cancelled() => {}
    }
}
