//! Heartbeat endpoint polled by the browser UI

use axum::extract::Extension;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use wizard_core::Session;

pub fn heartbeat_routes() -> Router {
    Router::new().route("/_/heartbeat", get(heartbeat))
}

async fn heartbeat(Extension(session): Extension<Arc<Session>>) -> &'static str {
    session.record_heartbeat();
    "Heartbeat received"
}
