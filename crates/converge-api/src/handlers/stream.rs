use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use std::sync::Arc;
use uuid::Uuid;

use converge_engine::{BranchRequest, TurnEvent};

use crate::state::AppState;

/// WebSocket endpoint driving one branching turn per connection.
///
/// The client sends a single branch request; the server relays token events
/// as they arrive from the completion engine, then exactly one terminal
/// `complete` or `error` message, and closes.
pub async fn conversation_stream(
    ws: WebSocketUpgrade,
    Path(conversation_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_stream(socket, state, conversation_id))
}

async fn handle_stream(mut socket: WebSocket, state: Arc<AppState>, conversation_id: Uuid) {
    tracing::debug!(%conversation_id, "websocket connected");

    if state.store.get_conversation(conversation_id).await.is_err() {
        send_error(&mut socket, "Conversation not found").await;
        let _ = socket.close().await;
        return;
    }

    // Exactly one structured request starts the turn; anything else is a
    // protocol error and nothing is created.
    let request = match receive_branch_request(&mut socket).await {
        Ok(request) => request,
        Err(message) => {
            tracing::warn!(%conversation_id, %message, "malformed branch request");
            send_error(&mut socket, &message).await;
            let _ = socket.close().await;
            return;
        }
    };

    let mut events = state.orchestrator.spawn_branch(conversation_id, request);
    while let Some(event) = events.recv().await {
        let terminal = event.is_terminal();
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(_) => break,
        };
        if socket.send(Message::Text(payload)).await.is_err() {
            // Client went away; dropping the receiver aborts the turn.
            tracing::debug!(%conversation_id, "client disconnected mid-stream");
            break;
        }
        if terminal {
            break;
        }
    }

    let _ = socket.close().await;
}

/// Parse the opening client message. The error string is relayed verbatim as
/// the turn's terminal error event.
pub fn parse_branch_request(text: &str) -> Result<BranchRequest, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid branch request: {}", e))
}

async fn receive_branch_request(socket: &mut WebSocket) -> Result<BranchRequest, String> {
    loop {
        match socket.recv().await {
            Some(Ok(Message::Text(text))) => {
                return parse_branch_request(&text);
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(_)) | Some(Err(_)) | None => {
                return Err("Invalid branch request: expected a text message".to_string());
            }
        }
    }
}

async fn send_error(socket: &mut WebSocket, message: &str) {
    let event = TurnEvent::Error {
        message: message.to_string(),
    };
    if let Ok(payload) = serde_json::to_string(&event) {
        let _ = socket.send(Message::Text(payload)).await;
    }
}
