//! Wizard Runner - Script Execution Strategies
//!
//! This crate turns a script body into a running process:
//! - Detached: temporary script file run inside an external terminal window
//! - Attached: interpreter on a pseudo-terminal, bridged to a remote channel
//! - Bridge: bidirectional PTY <-> remote frame pumping

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod attached;
pub mod bridge;
pub mod config;
pub mod detached;
pub mod error;

pub use attached::{AttachedProcess, AttachedRunner};
pub use bridge::{bridge, parse_resize, BridgeEnd, BridgeOutcome, Frame, TermSize};
pub use config::{RunnerConfig, DEFAULT_SHEBANG};
pub use detached::{prepare_script, DetachedRunner};
pub use error::{Error, Result};
