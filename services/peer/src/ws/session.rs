//! Manages the WebSocket connection lifecycle for one chat session.

use super::protocol::{ServerFrame, parse_client_text};
use crate::state::AppState;
use anyhow::Result;
use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Axum handler to upgrade `/ws/chat/{session_id}` to a WebSocket.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, session_id, state))
}

/// Runs one connection: every text frame is a user turn, answered in order.
#[instrument(name = "ws_session", skip(socket, state))]
async fn handle_socket(socket: WebSocket, session_id: String, state: Arc<AppState>) {
    info!("WebSocket connected.");
    let (mut socket_tx, mut socket_rx) = socket.split();

    while let Some(msg_result) = socket_rx.next().await {
        match msg_result {
            Ok(Message::Text(raw)) => {
                let text = parse_client_text(raw.as_str());
                if text.trim().is_empty() {
                    debug!("Skipping blank message.");
                    continue;
                }
                if let Err(e) = run_turn(&state, &session_id, &text, &mut socket_tx).await {
                    error!(error = ?e, "Failed to deliver reply. Closing session.");
                    break;
                }
            }
            Ok(Message::Binary(_)) => warn!("Ignoring binary frame."),
            Ok(Message::Close(_)) => {
                info!("Client sent close frame.");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Err(e) => {
                error!(error = ?e, "Error receiving from client WebSocket.");
                break;
            }
        }
    }

    info!("WebSocket disconnected.");
}

/// Answers one user message: the responder's chunks, then `TurnComplete`.
/// A responder failure is reported with an `Error` frame instead.
async fn run_turn(
    state: &AppState,
    session_id: &str,
    text: &str,
    socket_tx: &mut SplitSink<WebSocket, Message>,
) -> Result<()> {
    let replies = match state.responder.respond(session_id, text).await {
        Ok(replies) => replies,
        Err(e) => {
            warn!(error = ?e, "Responder failed.");
            return send_frame(
                socket_tx,
                ServerFrame::Error {
                    message: e.to_string(),
                },
            )
            .await;
        }
    };

    for reply in replies {
        send_frame(socket_tx, ServerFrame::AgentReply { text: reply }).await?;
    }
    send_frame(socket_tx, ServerFrame::TurnComplete).await
}

/// Serializes and sends a `ServerFrame` to the client.
pub(crate) async fn send_frame(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    frame: ServerFrame,
) -> Result<()> {
    let serialized = serde_json::to_string(&frame)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}
