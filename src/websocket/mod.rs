//! WebSocket module for the wizard
//!
//! Provides real-time communication endpoints:
//! - /_/ws/exec/:action_id - Interactive action execution on a PTY

pub mod exec;

pub use exec::exec_handler;

use axum::{routing::get, Router};

/// Create the WebSocket router
pub fn websocket_router() -> Router {
    Router::new().route("/_/ws/exec/:action_id", get(exec_handler))
}
