//! Wizard Core - Session Lifecycle
//!
//! This crate keeps the setup wizard alive exactly as long as it is needed:
//! - Catalog: Screens and actions loaded from TOML
//! - Inhibit: Scoped holds that suppress automatic shutdown
//! - Heartbeat: Client liveness supervision with one-shot shutdown
//! - Shutdown: Graceful shutdown coordination
//! - Session: Composition root dispatching actions to the runners

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod heartbeat;
pub mod inhibit;
pub mod session;
pub mod shutdown;

pub use catalog::{Action, ActionCatalog, Screen};
pub use error::{Error, Result};
pub use heartbeat::{
    HeartbeatConfig, HeartbeatSupervisor, SupervisorState, DEFAULT_CHECK_INTERVAL,
    DEFAULT_HEARTBEAT_TIMEOUT,
};
pub use inhibit::{InhibitGate, InhibitGuard};
pub use session::{AttachedSession, Session, SessionConfig};
pub use shutdown::{
    shutdown_on_signal, wait_for_shutdown_signal, ShutdownController, ShutdownPhase,
    ShutdownTrigger,
};
