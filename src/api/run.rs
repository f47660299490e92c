//! Detached action runs
//!
//! The action opens in a terminal window on the desktop; the browser is sent
//! straight back to the start page while it runs.

use super::ApiError;
use axum::extract::{Extension, Path};
use axum::response::Redirect;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use wizard_core::Session;

pub fn run_routes() -> Router {
    Router::new().route("/_/run/:action_id", post(run_action))
}

async fn run_action(
    Path(action_id): Path<String>,
    Extension(session): Extension<Arc<Session>>,
) -> Result<Redirect, ApiError> {
    // Launch failures are logged by the session; the client only sees lookup errors.
    session.trigger_detached(&action_id)?;
    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{send, session};
    use axum::http::{header, StatusCode};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_redirects_home() {
        let scratch = tempfile::tempdir().unwrap();
        let session = session(scratch.path());
        let app = run_routes().layer(Extension(session.clone()));

        let response = send(app, "POST", "/_/run/true").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        // The background run releases its hold once the script exits.
        tokio::time::timeout(Duration::from_secs(10), async {
            while session.inhibit().is_inhibited() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_unknown_action_is_not_found() {
        let scratch = tempfile::tempdir().unwrap();
        let app = run_routes().layer(Extension(session(scratch.path())));

        let response = send(app, "POST", "/_/run/missing-id").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_script_is_bad_request() {
        let scratch = tempfile::tempdir().unwrap();
        let app = run_routes().layer(Extension(session(scratch.path())));

        let response = send(app, "POST", "/_/run/blank").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_is_not_allowed() {
        let scratch = tempfile::tempdir().unwrap();
        let app = run_routes().layer(Extension(session(scratch.path())));

        let response = send(app, "GET", "/_/run/true").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
