//! Heartbeat supervision
//!
//! The browser UI pings the server periodically. When the pings stop for
//! longer than the configured timeout and no action is running, the
//! supervisor shuts the whole process down. The trigger is one-shot.
//!
//! ```text
//! Running ──fresh──▶ Running
//! Running ──stale & uninhibited──▶ ShuttingDown ──▶ Terminated
//! Running ──cancelled──▶ Stopped
//! ```

use crate::inhibit::InhibitGate;
use crate::shutdown::ShutdownTrigger;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default time between staleness checks
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Default silence after which the client is considered gone
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(10);

/// Supervisor timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// Silence threshold
    pub timeout: Duration,
    /// Time between checks
    pub check_interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_HEARTBEAT_TIMEOUT,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }
}

/// Supervisor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Watching heartbeats
    Running,
    /// Stale client detected, shutdown in progress
    ShuttingDown,
    /// Shutdown was triggered
    Terminated,
    /// Cancelled without shutting down
    Stopped,
}

impl SupervisorState {
    fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::ShuttingDown,
            2 => Self::Terminated,
            _ => Self::Stopped,
        }
    }
}

impl std::fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::ShuttingDown => write!(f, "ShuttingDown"),
            Self::Terminated => write!(f, "Terminated"),
            Self::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Shuts the process down when the client stops sending heartbeats
pub struct HeartbeatSupervisor {
    last_beat: Mutex<Instant>,
    inhibit: InhibitGate,
    config: HeartbeatConfig,
    state: AtomicU32,
}

impl HeartbeatSupervisor {
    /// Create a supervisor; the first heartbeat is "now"
    #[must_use]
    pub fn new(config: HeartbeatConfig, inhibit: InhibitGate) -> Self {
        Self {
            last_beat: Mutex::new(Instant::now()),
            inhibit,
            config,
            state: AtomicU32::new(SupervisorState::Running as u32),
        }
    }

    /// Timing in use
    #[must_use]
    pub fn config(&self) -> HeartbeatConfig {
        self.config
    }

    /// Note that the client is still there
    pub fn record_heartbeat(&self) {
        let mut last = self.last_beat.lock().unwrap_or_else(|e| e.into_inner());
        *last = Instant::now();
        debug!("Heartbeat received");
    }

    /// Time since the last heartbeat
    #[must_use]
    pub fn since_last_beat(&self) -> Duration {
        self.last_beat
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .elapsed()
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SupervisorState {
        SupervisorState::from_u32(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: SupervisorState) {
        self.state.store(state as u32, Ordering::SeqCst);
        debug!(state = %state, "Heartbeat supervisor state changed");
    }

    /// Move from `Running` to `ShuttingDown`; only one caller ever succeeds.
    fn claim_shutdown(&self) -> Result<(), SupervisorState> {
        self.state
            .compare_exchange(
                SupervisorState::Running as u32,
                SupervisorState::ShuttingDown as u32,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .map(|_| ())
            .map_err(SupervisorState::from_u32)
    }

    /// Whether the client is gone and nothing holds the process open.
    ///
    /// Evaluated under the heartbeat lock so a concurrent beat is either
    /// fully before or fully after the check.
    fn should_shut_down(&self) -> Option<Duration> {
        let last = self.last_beat.lock().unwrap_or_else(|e| e.into_inner());
        let elapsed = last.elapsed();
        if elapsed > self.config.timeout && !self.inhibit.is_inhibited() {
            Some(elapsed)
        } else {
            None
        }
    }

    /// Watch heartbeats until the client goes away or `cancel` fires.
    ///
    /// Fires `trigger` at most once per supervisor. Returns the final state;
    /// calling again after the loop ended returns immediately.
    pub async fn run(
        &self,
        cancel: CancellationToken,
        trigger: &dyn ShutdownTrigger,
    ) -> SupervisorState {
        let state = self.state();
        if state != SupervisorState::Running {
            debug!(state = %state, "Heartbeat supervisor already finished");
            return state;
        }

        let period = self.config.check_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            timeout_secs = self.config.timeout.as_secs(),
            check_interval_secs = period.as_secs(),
            "Heartbeat supervisor started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Heartbeat supervisor stopped");
                    return match self.state.compare_exchange(
                        SupervisorState::Running as u32,
                        SupervisorState::Stopped as u32,
                        Ordering::SeqCst,
                        Ordering::SeqCst,
                    ) {
                        Ok(_) => SupervisorState::Stopped,
                        Err(current) => SupervisorState::from_u32(current),
                    };
                }
                _ = ticker.tick() => {
                    if let Some(elapsed) = self.should_shut_down() {
                        if let Err(current) = self.claim_shutdown() {
                            debug!(state = %current, "Shutdown already claimed by another run");
                            return current;
                        }
                        warn!(
                            silent_secs = elapsed.as_secs(),
                            "No heartbeat received, shutting down"
                        );
                        if let Err(e) = trigger.trigger().await {
                            error!(error = %e, "Shutdown error");
                        }
                        self.set_state(SupervisorState::Terminated);
                        return SupervisorState::Terminated;
                    }
                    if self.inhibit.is_inhibited() {
                        debug!(active = self.inhibit.count(), "Shutdown inhibited by running action");
                    }
                }
            }
        }
    }
}
