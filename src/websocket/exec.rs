//! Attached execution over WebSocket
//!
//! The action runs on a PTY; its output is streamed to the browser as
//! binary frames and every frame from the browser is fed back as input.

use crate::api::ApiError;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Extension, Path,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures::{future, SinkExt, Stream, StreamExt};
use std::sync::Arc;
use tracing::{info, warn};
use wizard_core::{AttachedSession, Session};
use wizard_runner::Frame;

/// WebSocket upgrade handler
///
/// Unknown or empty actions are rejected before the upgrade.
pub async fn exec_handler(
    Path(action_id): Path<String>,
    Extension(session): Extension<Arc<Session>>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    if let Err(e) = session.resolve(&action_id) {
        return ApiError(e).into_response();
    }
    let Some(ws) = ws else {
        return (StatusCode::BAD_REQUEST, "WebSocket upgrade required").into_response();
    };
    ws.on_upgrade(move |socket| handle_socket(socket, session, action_id))
}

/// Handle WebSocket connection
async fn handle_socket(mut socket: WebSocket, session: Arc<Session>, action_id: String) {
    let attached = match session.start_attached(&action_id) {
        Ok(attached) => attached,
        Err(e) => {
            warn!(action_id = %action_id, error = %e, "Could not start attached action");
            let _ = socket
                .send(Message::Text(format!("Error starting command: {e}")))
                .await;
            let _ = socket.close().await;
            return;
        }
    };

    info!(
        action_id = %action_id,
        session_id = %attached.session_id(),
        "WebSocket exec connection established"
    );
    run_attached(socket, attached).await;
}

async fn run_attached(socket: WebSocket, attached: AttachedSession) {
    let (sender, receiver) = socket.split();
    let sink = sender.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(into_message(frame))));
    attached.run(sink, incoming_frames(receiver)).await;
}

fn into_message(frame: Frame) -> Message {
    match frame {
        Frame::Binary(bytes) => Message::Binary(bytes),
        Frame::Text(text) => Message::Text(text),
    }
}

/// Client messages up to the first close frame, as bridge frames.
///
/// Ping and pong are answered by axum and never reach the process.
fn incoming_frames<S>(receiver: S) -> impl Stream<Item = Result<Frame, axum::Error>>
where
    S: Stream<Item = Result<Message, axum::Error>>,
{
    receiver
        .take_while(|msg| future::ready(!matches!(msg, Ok(Message::Close(_)))))
        .filter_map(|msg| {
            future::ready(match msg {
                Ok(Message::Binary(bytes)) => Some(Ok(Frame::Binary(bytes))),
                Ok(Message::Text(text)) => Some(Ok(Frame::Text(text))),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
        })
}
