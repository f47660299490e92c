//! Session: the composition root for running actions
//!
//! Owns the heartbeat supervisor and the inhibit gate, resolves action IDs
//! against the catalog and dispatches to one of the two execution
//! strategies. Every execution holds an inhibit guard for its full duration,
//! so a long script keeps the process alive without browser heartbeats.

use crate::catalog::{Action, ActionCatalog};
use crate::error::{Error, Result};
use crate::heartbeat::{HeartbeatConfig, HeartbeatSupervisor};
use crate::inhibit::{InhibitGate, InhibitGuard};
use futures::{Sink, Stream};
use std::fmt::Display;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;
use wizard_runner::{
    AttachedProcess, AttachedRunner, BridgeOutcome, DetachedRunner, Frame, RunnerConfig,
};

/// Settings for a [`Session`]
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Heartbeat supervision timing
    pub heartbeat: HeartbeatConfig,
    /// Process runner settings
    pub runner: RunnerConfig,
}

/// Entry point for the request layer
pub struct Session {
    catalog: Arc<ActionCatalog>,
    inhibit: InhibitGate,
    supervisor: Arc<HeartbeatSupervisor>,
    detached: DetachedRunner,
    attached: AttachedRunner,
}

impl Session {
    /// Create a session over a loaded catalog
    #[must_use]
    pub fn new(catalog: Arc<ActionCatalog>, config: SessionConfig) -> Self {
        let inhibit = InhibitGate::new();
        let supervisor = Arc::new(HeartbeatSupervisor::new(config.heartbeat, inhibit.clone()));
        Self {
            catalog,
            inhibit,
            supervisor,
            detached: DetachedRunner::new(config.runner.clone()),
            attached: AttachedRunner::new(config.runner),
        }
    }

    /// The action catalog
    #[must_use]
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// The heartbeat supervisor, for spawning its run loop
    #[must_use]
    pub fn supervisor(&self) -> Arc<HeartbeatSupervisor> {
        Arc::clone(&self.supervisor)
    }

    /// The gate that holds off automatic shutdown
    #[must_use]
    pub fn inhibit(&self) -> &InhibitGate {
        &self.inhibit
    }

    /// Record client liveness
    pub fn record_heartbeat(&self) {
        self.supervisor.record_heartbeat();
    }

    /// Look up a runnable action without starting anything
    pub fn resolve(&self, action_id: &str) -> Result<&Action> {
        let action = self
            .catalog
            .lookup(action_id)
            .ok_or_else(|| Error::ActionNotFound(action_id.to_string()))?;
        if !action.has_script() {
            return Err(Error::EmptyScript(action_id.to_string()));
        }
        Ok(action)
    }

    /// Run an action in a terminal window and wait for the window to close.
    pub async fn run_detached(&self, action_id: &str) -> Result<()> {
        let action = self.resolve(action_id)?;
        let _guard = self.inhibit.acquire();
        info!(action_id = %action_id, title = %action.title, "Running detached action");
        self.detached.run(&action.script).await?;
        Ok(())
    }

    /// Start an action in a terminal window without waiting for it.
    ///
    /// Lookup errors are returned; launch and script failures are only
    /// logged. The returned handle may be ignored.
    pub fn trigger_detached(&self, action_id: &str) -> Result<JoinHandle<()>> {
        let action = self.resolve(action_id)?;
        let guard = self.inhibit.acquire();
        let runner = self.detached.clone();
        let script = action.script.clone();
        let action_id = action_id.to_string();
        let run_id = Uuid::new_v4();
        info!(action_id = %action_id, run_id = %run_id, "Triggering detached action");

        Ok(tokio::spawn(async move {
            let _guard = guard;
            match runner.run(&script).await {
                Ok(()) => info!(action_id = %action_id, run_id = %run_id, "Detached action finished"),
                Err(e) => error!(
                    action_id = %action_id,
                    run_id = %run_id,
                    error = %e,
                    "Detached action failed"
                ),
            }
        }))
    }

    /// Start an action on a PTY; bridge it with [`AttachedSession::run`].
    pub fn start_attached(&self, action_id: &str) -> Result<AttachedSession> {
        let action = self.resolve(action_id)?;
        let guard = self.inhibit.acquire();
        let process = self.attached.spawn(&action.script).map_err(|e| {
            warn!(action_id = %action_id, error = %e, "Failed to start attached action");
            e
        })?;
        Ok(AttachedSession {
            action_id: action_id.to_string(),
            session_id: Uuid::new_v4(),
            process,
            buffer_size: self.attached.read_buffer_size(),
            _guard: guard,
        })
    }

    /// Run an action on a PTY and bridge it to the remote channel until
    /// either side closes.
    pub async fn open_attached_stream<Tx, Rx, E>(
        &self,
        action_id: &str,
        sink: Tx,
        stream: Rx,
    ) -> Result<BridgeOutcome>
    where
        Tx: Sink<Frame> + Send + 'static,
        Tx::Error: Display + Send,
        Rx: Stream<Item = std::result::Result<Frame, E>>,
        E: Display,
    {
        let attached = self.start_attached(action_id)?;
        Ok(attached.run(sink, stream).await)
    }
}

/// A started attached action, waiting to be bridged.
///
/// Holds an inhibit guard until [`AttachedSession::run`] returns or the value
/// is dropped. Dropping it unbridged kills the script.
#[derive(Debug)]
pub struct AttachedSession {
    action_id: String,
    session_id: Uuid,
    process: AttachedProcess,
    buffer_size: usize,
    _guard: InhibitGuard,
}

impl AttachedSession {
    /// ID of the running action
    #[must_use]
    pub fn action_id(&self) -> &str {
        &self.action_id
    }

    /// Unique ID of this stream session
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// OS process id of the running script
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.id()
    }

    /// Bridge the process to the remote channel until either side closes.
    pub async fn run<Tx, Rx, E>(self, sink: Tx, stream: Rx) -> BridgeOutcome
    where
        Tx: Sink<Frame> + Send + 'static,
        Tx::Error: Display + Send,
        Rx: Stream<Item = std::result::Result<Frame, E>>,
        E: Display,
    {
        let Self {
            action_id,
            session_id,
            process,
            buffer_size,
            _guard,
        } = self;
        info!(action_id = %action_id, session_id = %session_id, "Attached session started");
        let outcome = wizard_runner::bridge(process, sink, stream, buffer_size).await;
        info!(
            action_id = %action_id,
            session_id = %session_id,
            end = ?outcome.end,
            exit_code = ?outcome.exit_code,
            "Attached session ended"
        );
        outcome
    }
}
