//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::ws::gateway::Session;
use crate::ws::outbound::Outbound;
use crate::ws::protocol::ServerMsg;

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    info!(conn_id = %conn_id, "New WebSocket connection");

    let (ws_sink, mut ws_stream) = socket.split();
    let (outbound, outbound_rx) = Outbound::channel(conn_id, state.config.outbound_buffer);

    // Writer task: outbound queue -> WebSocket
    let writer_handle = tokio::spawn(write_loop(conn_id, ws_sink, outbound_rx));

    let session = Session::open(state.matchmaking.clone(), outbound);

    // Reader loop: WebSocket -> session
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => session.handle_text(&text),
            Ok(Message::Binary(_)) => {
                debug!(conn_id = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(conn_id = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Dropping the session is the disconnect signal
    drop(session);
    writer_handle.abort();

    info!(conn_id = %conn_id, "WebSocket connection closed");
}

async fn write_loop(
    conn_id: Uuid,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<ServerMsg>,
) {
    while let Some(msg) = outbound_rx.recv().await {
        let json = match serde_json::to_string(&msg) {
            Ok(json) => json,
            Err(e) => {
                error!(conn_id = %conn_id, error = %e, "Failed to serialize message");
                continue;
            }
        };
        if let Err(e) = ws_sink.send(Message::Text(json)).await {
            debug!(conn_id = %conn_id, error = %e, "WebSocket send failed");
            break;
        }
    }
}
