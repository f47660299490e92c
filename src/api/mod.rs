//! Web API module for the wizard
//!
//! Provides HTTP endpoints for:
//! - Heartbeats from the browser UI
//! - Screen and action listing
//! - Detached action runs
//! - Health checks

pub mod health;
pub mod heartbeat;
pub mod run;
pub mod screens;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;

pub use health::health_routes;
pub use heartbeat::heartbeat_routes;
pub use run::run_routes;
pub use screens::screens_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(heartbeat_routes())
        .merge(screens_routes())
        .merge(run_routes())
}

/// Session errors rendered as HTTP responses
#[derive(Debug)]
pub struct ApiError(pub wizard_core::Error);

impl From<wizard_core::Error> for ApiError {
    fn from(err: wizard_core::Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            wizard_core::Error::ActionNotFound(_) => StatusCode::NOT_FOUND,
            wizard_core::Error::EmptyScript(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.to_string()).into_response()
    }
}
