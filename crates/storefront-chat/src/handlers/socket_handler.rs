use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use storefront_core::problemdetails::Problem;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use super::AppState;
use crate::hub::ChatHub;

/// Live feed of a conversation. Every new message and status change is
/// pushed as a JSON `ChatEvent`; anything the client sends is ignored.
#[utoipa::path(
    tag = "Chat",
    get,
    path = "/conversations/{id}/ws",
    params(("id" = i32, Path, description = "Conversation ID")),
    responses(
        (status = 101, description = "Switching to WebSocket"),
        (status = 404, description = "Conversation not found", body = storefront_core::ProblemDetails)
    )
)]
pub async fn conversation_socket(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Response, Problem> {
    state.conversation_service.get_conversation(id).await?;
    let hub = state.hub.clone();
    Ok(ws.on_upgrade(move |socket| stream_conversation(socket, hub, id)))
}

async fn stream_conversation(socket: WebSocket, hub: Arc<ChatHub>, conversation_id: i32) {
    let mut events = hub.subscribe(conversation_id).await;
    let (mut sender, mut receiver) = socket.split();
    debug!("Subscriber joined conversation {}", conversation_id);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let Ok(json) = serde_json::to_string(&event) else {
                        continue;
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Subscriber of conversation {} lagged, {} events dropped",
                        conversation_id, skipped
                    );
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!("WebSocket error on conversation {}: {}", conversation_id, e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    drop(events);
    hub.release(conversation_id).await;
    debug!("Subscriber left conversation {}", conversation_id);
}
