//! HTTP router assembly

use axum::{routing::get, Extension, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use wizard_core::Session;

/// Build the main router with all endpoints
pub fn build_router(session: Arc<Session>, static_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .merge(crate::api::health_routes())
        .merge(crate::api::api_router())
        .merge(crate::websocket::websocket_router())
        .layer(Extension(session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    match static_dir.filter(|dir| dir.is_dir()) {
        Some(dir) => {
            info!("Web UI enabled: serving from {}", dir.display());
            let serve_dir = ServeDir::new(dir)
                .append_index_html_on_directories(true)
                .fallback(tower_http::services::ServeFile::new(dir.join("index.html")));
            app.fallback_service(serve_dir)
        }
        None => app.route("/", get(|| async { "Setup Wizard" })),
    }
}
