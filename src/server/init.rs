//! Server initialization
//!
//! Contains the main `run()` function that starts all server components.

use super::config::AppConfig;
use super::router::build_router;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use wizard_core::{shutdown_on_signal, ActionCatalog, Session, ShutdownController};

/// Run the server until shutdown
pub async fn run(config: AppConfig) -> Result<()> {
    info!("Starting Setup Wizard v{}", env!("CARGO_PKG_VERSION"));

    let catalog = ActionCatalog::load(&config.catalog.path).with_context(|| {
        format!(
            "Failed to load action catalog from {}",
            config.catalog.path.display()
        )
    })?;
    let session = Arc::new(Session::new(Arc::new(catalog), config.session_config()));

    let shutdown_controller = ShutdownController::new();

    // Heartbeat supervisor: stops the server once the browser goes away
    let supervisor = session.supervisor();
    let supervisor_token = shutdown_controller.token();
    let supervisor_trigger = shutdown_controller.clone();
    let supervisor_handle = tokio::spawn(async move {
        supervisor
            .run(supervisor_token, supervisor_trigger.as_ref())
            .await
    });

    tokio::spawn(shutdown_on_signal(shutdown_controller.clone()));

    let app = build_router(session.clone(), config.server.static_dir.as_deref());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!("HTTP server listening on http://{}", addr);

    if let Some(command) = config.server.wrapper_command() {
        spawn_exec_wrapper(command);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_controller.clone().wait())
        .await
        .context("HTTP server error")?;

    // The server can also stop on its own; make sure the supervisor ends too.
    shutdown_controller.shutdown();
    match supervisor_handle.await {
        Ok(state) => info!(state = %state, "Heartbeat supervisor finished"),
        Err(e) => warn!("Heartbeat supervisor task error: {}", e),
    }

    if session.inhibit().is_inhibited() {
        warn!(
            active = session.inhibit().count(),
            "Shutting down with actions still running"
        );
    }

    shutdown_controller.complete();
    info!("Setup Wizard shutdown complete");
    Ok(())
}

/// Start the configured exec wrapper (e.g. a browser pointed at the server)
fn spawn_exec_wrapper(command: String) {
    info!(command = %command, "Starting exec wrapper");
    tokio::spawn(async move {
        match tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&command)
            .status()
            .await
        {
            Ok(status) if status.success() => info!("Exec wrapper exited"),
            Ok(status) => warn!(status = %status, "Exec wrapper exited with failure"),
            Err(e) => error!(error = %e, "Failed to start exec wrapper"),
        }
    });
}
