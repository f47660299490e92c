//! Health check endpoint

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use wizard_core::Session;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether a running action is holding off automatic shutdown
    pub inhibited: bool,
    pub running_actions: usize,
}

/// Create health check routes
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_check))
}

async fn health_check(Extension(session): Extension<Arc<Session>>) -> Json<HealthResponse> {
    let inhibit = session.inhibit();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        inhibited: inhibit.is_inhibited(),
        running_actions: inhibit.count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_bytes, send, session};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_reports_inhibition() {
        let scratch = tempfile::tempdir().unwrap();
        let session = session(scratch.path());
        let app = health_routes().layer(Extension(session.clone()));

        let response = send(app.clone(), "GET", "/health").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["inhibited"], false);

        let _guard = session.inhibit().acquire();
        let response = send(app, "GET", "/health").await;
        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["inhibited"], true);
        assert_eq!(json["running_actions"], 1);
    }
}
