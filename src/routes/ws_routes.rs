use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChatMessage, ClientEvent, ServerEvent};
use crate::routes::auth::AuthSession;
use crate::service::chat_service::{ChatService, ConnectionId, Delivery};
use crate::state::AppState;

/// GET `/ws` — upgrades a logged-in browser to the chat event stream.
pub async fn ws_chat_handler(
    _session: AuthSession,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.chat))
}

/// Handles a single WebSocket connection.
///
/// Protocol: every frame is a JSON envelope `{ "event": "...", "data": {...} }`.
/// - On connect the recent history is replayed as `receive_message` events.
/// - Client events: `join_chat`, `send_message`, `typing`, `stop_typing`.
/// - Invalid frames are answered with `{ "event": "error", ... }` to this
///   socket only; the connection stays open.
async fn handle_socket(socket: WebSocket, chat: ChatService) {
    let connection_id: ConnectionId = Uuid::new_v4();
    let (sender, mut receiver) = socket.split();
    let (events, history) = chat.attach();
    info!(%connection_id, connections = chat.connection_count(), "WebSocket client connected");
    let (reply_tx, reply_rx) = mpsc::channel::<ServerEvent>(32);

    let send_task = tokio::spawn(forward_events(sender, connection_id, history, reply_rx, events));

    let mut joined_as: Option<String> = None;
    while let Some(frame) = receiver.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                warn!(%connection_id, "WebSocket receive error: {e}");
                break;
            }
        };

        let text = match frame {
            Message::Text(t) => t,
            Message::Close(_) => break,
            _ => continue,
        };

        if let Err(e) = handle_event(&chat, connection_id, &mut joined_as, text.as_str()) {
            debug!(%connection_id, "rejected client event: {e}");
            let _ = reply_tx.send(ServerEvent::Error { message: e.to_string() }).await;
        }
    }

    send_task.abort();
    if let Some(username) = joined_as {
        chat.leave(&username);
    }
    info!(%connection_id, "WebSocket client disconnected");
}

/// Applies one client frame to the room.
fn handle_event(
    chat: &ChatService,
    connection_id: ConnectionId,
    joined_as: &mut Option<String>,
    text: &str,
) -> Result<(), AppError> {
    let event: ClientEvent = serde_json::from_str(text).map_err(AppError::InvalidEvent)?;
    match event {
        ClientEvent::JoinChat { username } => {
            let username = chat.join(&username)?;
            // A connection holds one name; switching names releases the old one.
            if let Some(previous) = joined_as.replace(username) {
                if joined_as.as_deref() != Some(previous.as_str()) {
                    chat.leave(&previous);
                }
            }
        }
        ClientEvent::SendMessage { username, message } => {
            chat.post_message(&username, &message)?;
        }
        ClientEvent::Typing { username } => chat.relay_typing(connection_id, &username, true),
        ClientEvent::StopTyping { username } => chat.relay_typing(connection_id, &username, false),
    }
    Ok(())
}

/// Owns the write half: replays history, then forwards direct replies and
/// room broadcasts until the socket or the room goes away.
async fn forward_events(
    mut sender: SplitSink<WebSocket, Message>,
    connection_id: ConnectionId,
    history: Vec<ChatMessage>,
    mut replies: mpsc::Receiver<ServerEvent>,
    mut events: broadcast::Receiver<Delivery>,
) {
    for message in history {
        if send_event(&mut sender, &ServerEvent::ReceiveMessage(message)).await.is_err() {
            return;
        }
    }

    loop {
        let event = tokio::select! {
            Some(reply) = replies.recv() => reply,
            delivery = events.recv() => match delivery {
                Ok(delivery) if delivery.is_for(connection_id) => delivery.event,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%connection_id, skipped, "client fell behind the room");
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
        };

        if send_event(&mut sender, &event).await.is_err() {
            break;
        }
    }
}

/// Helper: serialize a `ServerEvent` and send it over the socket.
async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json.into())).await,
        Err(e) => {
            warn!("Failed to serialize event: {e}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut broadcast::Receiver<Delivery>) -> Vec<ServerEvent> {
        let mut out = Vec::new();
        while let Ok(delivery) = rx.try_recv() {
            out.push(delivery.event);
        }
        out
    }

    #[test]
    fn join_event_records_the_trimmed_name() {
        let chat = ChatService::new(1000, 50);
        let mut joined_as = None;
        handle_event(
            &chat,
            Uuid::new_v4(),
            &mut joined_as,
            r#"{"event":"join_chat","data":{"username":" alice "}}"#,
        )
        .unwrap();
        assert_eq!(joined_as.as_deref(), Some("alice"));
    }

    #[test]
    fn blank_join_is_rejected_and_leaves_no_name() {
        let chat = ChatService::new(1000, 50);
        let mut joined_as = None;
        let err = handle_event(
            &chat,
            Uuid::new_v4(),
            &mut joined_as,
            r#"{"event":"join_chat","data":{"username":"  "}}"#,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Username is required");
        assert!(joined_as.is_none());
    }

    #[test]
    fn joining_under_a_new_name_releases_the_old_one() {
        let chat = ChatService::new(1000, 50);
        let connection = Uuid::new_v4();
        let mut joined_as = None;
        handle_event(
            &chat,
            connection,
            &mut joined_as,
            r#"{"event":"join_chat","data":{"username":"alice"}}"#,
        )
        .unwrap();
        let mut rx = chat.subscribe();

        handle_event(
            &chat,
            connection,
            &mut joined_as,
            r#"{"event":"join_chat","data":{"username":"bob"}}"#,
        )
        .unwrap();

        assert_eq!(joined_as.as_deref(), Some("bob"));
        assert!(!chat.is_active("alice"));
        assert!(chat.is_active("bob"));
        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&ServerEvent::UserLeft { username: "alice".into() }));
    }

    #[test]
    fn joining_twice_under_the_same_name_keeps_it_active() {
        let chat = ChatService::new(1000, 50);
        let connection = Uuid::new_v4();
        let mut joined_as = None;
        for _ in 0..2 {
            handle_event(
                &chat,
                connection,
                &mut joined_as,
                r#"{"event":"join_chat","data":{"username":"alice"}}"#,
            )
            .unwrap();
        }
        assert_eq!(joined_as.as_deref(), Some("alice"));
        assert!(chat.is_active("alice"));
    }

    #[test]
    fn malformed_frames_are_invalid_events() {
        let chat = ChatService::new(1000, 50);
        let err = handle_event(&chat, Uuid::new_v4(), &mut None, "not json").unwrap_err();
        assert!(matches!(err, AppError::InvalidEvent(_)));
    }

    #[test]
    fn send_and_typing_events_reach_the_room() {
        let chat = ChatService::new(1000, 50);
        let mut rx = chat.subscribe();
        let connection = Uuid::new_v4();
        let mut joined_as = None;

        for frame in [
            r#"{"event":"typing","data":{"username":"bob"}}"#,
            r#"{"event":"send_message","data":{"username":"bob","message":"hi"}}"#,
            r#"{"event":"stop_typing","data":{"username":"bob"}}"#,
        ] {
            handle_event(&chat, connection, &mut joined_as, frame).unwrap();
        }

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], ServerEvent::UserTyping { username: "bob".into() });
        assert!(matches!(&events[1], ServerEvent::ReceiveMessage(m) if m.message == "hi"));
        assert_eq!(events[2], ServerEvent::UserStopTyping { username: "bob".into() });
        assert!(joined_as.is_none());
    }
}
