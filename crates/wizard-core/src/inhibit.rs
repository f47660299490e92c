//! Shutdown inhibition
//!
//! While an action runs, the heartbeat supervisor must not stop the process
//! even if the browser stops sending heartbeats. Each running action holds
//! an [`InhibitGuard`]; the gate is raised while any guard is alive.
//!
//! ## Usage
//!
//! ```ignore
//! let gate = InhibitGate::new();
//! {
//!     let _guard = gate.acquire();
//!     run_action().await?; // released on return, error or unwind
//! }
//! assert!(!gate.is_inhibited());
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Shared counter of in-flight actions
#[derive(Debug, Clone, Default)]
pub struct InhibitGate {
    count: Arc<AtomicUsize>,
}

impl InhibitGate {
    /// Create a lowered gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the gate until the returned guard is dropped
    #[must_use = "the gate is released as soon as the guard is dropped"]
    pub fn acquire(&self) -> InhibitGuard {
        let previous = self.count.fetch_add(1, Ordering::SeqCst);
        debug!(active = previous + 1, "Shutdown inhibited");
        InhibitGuard {
            count: Arc::clone(&self.count),
        }
    }

    /// Whether any guard is outstanding
    #[must_use]
    pub fn is_inhibited(&self) -> bool {
        self.count() > 0
    }

    /// Number of outstanding guards
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

/// Releases one hold on the gate when dropped.
///
/// Only [`InhibitGate::acquire`] creates guards, so every release has a
/// matching acquire and the count cannot underflow.
#[derive(Debug)]
pub struct InhibitGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for InhibitGuard {
    fn drop(&mut self) {
        let previous = self.count.fetch_sub(1, Ordering::SeqCst);
        debug!(active = previous - 1, "Shutdown inhibition released");
    }
}
