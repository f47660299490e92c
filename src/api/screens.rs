//! Screen listing for the browser UI

use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use std::sync::Arc;
use wizard_core::{Action, Screen, Session};

/// Action as shown to the client; scripts stay on the server
#[derive(Debug, Serialize)]
pub struct ActionView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub has_script: bool,
}

impl From<&Action> for ActionView {
    fn from(action: &Action) -> Self {
        Self {
            id: action.id.clone(),
            title: action.title.clone(),
            description: action.description.clone(),
            has_script: action.has_script(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ScreenView {
    pub index: usize,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub actions: Vec<ActionView>,
}

impl ScreenView {
    fn new(index: usize, screen: &Screen) -> Self {
        Self {
            index,
            title: screen.title.clone(),
            description: screen.description.clone(),
            actions: screen.actions.iter().map(ActionView::from).collect(),
        }
    }
}

pub fn screens_routes() -> Router {
    Router::new()
        .route("/api/screens", get(list_screens))
        .route("/api/screens/:idx", get(get_screen))
}

async fn list_screens(Extension(session): Extension<Arc<Session>>) -> Json<Vec<ScreenView>> {
    let screens = session
        .catalog()
        .screens()
        .iter()
        .enumerate()
        .map(|(idx, screen)| ScreenView::new(idx, screen))
        .collect();
    Json(screens)
}

async fn get_screen(
    Path(idx): Path<String>,
    Extension(session): Extension<Arc<Session>>,
) -> impl IntoResponse {
    let idx = match idx.parse::<usize>() {
        Ok(i) => i,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid screen index").into_response(),
    };

    match session.catalog().screen(idx) {
        Some(screen) => Json(ScreenView::new(idx, screen)).into_response(),
        None => (StatusCode::BAD_REQUEST, "Invalid screen index").into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{body_bytes, send, session};

    fn app(scratch: &std::path::Path) -> Router {
        screens_routes().layer(Extension(session(scratch)))
    }

    #[tokio::test]
    async fn test_list_screens() {
        let scratch = tempfile::tempdir().unwrap();
        let response = send(app(scratch.path()), "GET", "/api/screens").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        let screens = json.as_array().unwrap();
        assert_eq!(screens.len(), 2);
        assert_eq!(screens[0]["title"], "Basics");
        assert_eq!(screens[0]["actions"][0]["id"], "echo");
        assert_eq!(screens[0]["actions"][0]["has_script"], true);
        assert_eq!(screens[0]["actions"][1]["has_script"], false);
        assert!(screens[0]["actions"][0].get("script").is_none());
        assert!(screens[1].get("description").is_none());
    }

    #[tokio::test]
    async fn test_get_screen_by_index() {
        let scratch = tempfile::tempdir().unwrap();
        let response = send(app(scratch.path()), "GET", "/api/screens/1").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
        assert_eq!(json["index"], 1);
        assert_eq!(json["title"], "Tools");
    }

    #[tokio::test]
    async fn test_invalid_screen_index() {
        let scratch = tempfile::tempdir().unwrap();
        for uri in ["/api/screens/7", "/api/screens/abc", "/api/screens/-1"] {
            let response = send(app(scratch.path()), "GET", uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }
}
