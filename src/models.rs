use chrono::Local;
use serde::{Deserialize, Serialize};

/// Author name stamped on room-generated messages.
pub const SYSTEM_AUTHOR: &str = "System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub username: String,
    pub message: String,
    /// Wall-clock `HH:MM` at the moment the room accepted the message.
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl ChatMessage {
    pub fn new(id: u64, username: String, message: String, kind: MessageKind) -> Self {
        Self {
            id,
            username,
            message,
            timestamp: Local::now().format("%H:%M").to_string(),
            kind,
        }
    }

    pub fn system(id: u64, message: String) -> Self {
        Self::new(id, SYSTEM_AUTHOR.to_string(), message, MessageKind::System)
    }

    pub fn user(id: u64, username: String, message: String) -> Self {
        Self::new(id, username, message, MessageKind::User)
    }
}

/// Event sent by a browser over the WebSocket.
///
/// Wire shape: `{"event": "join_chat", "data": {"username": "alice"}}`.
/// Missing fields default to empty strings so validation can answer with
/// a proper `error` event instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinChat {
        #[serde(default)]
        username: String,
    },
    SendMessage {
        #[serde(default)]
        username: String,
        #[serde(default)]
        message: String,
    },
    Typing {
        #[serde(default)]
        username: String,
    },
    StopTyping {
        #[serde(default)]
        username: String,
    },
}

/// Event pushed from the server to browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage(ChatMessage),
    MessageDeleted { id: u64 },
    UserTyping { username: String },
    UserStopTyping { username: String },
    UserJoined { username: String },
    UserLeft { username: String },
    Error { message: String },
}

/// Body of `POST /delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub id: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub status: &'static str,
}

impl DeleteResponse {
    pub fn deleted() -> Self {
        Self { status: "deleted" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn client_event_parses_event_envelope() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "send_message",
            "data": {"username": "alice", "message": "hi"}
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::SendMessage { username: "alice".into(), message: "hi".into() }
        );
    }

    #[test]
    fn client_event_missing_fields_default_to_empty() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "join_chat", "data": {}})).unwrap();
        assert_eq!(event, ClientEvent::JoinChat { username: String::new() });
    }

    #[test]
    fn client_event_rejects_unknown_names() {
        let result = serde_json::from_value::<ClientEvent>(json!({"event": "shout", "data": {}}));
        assert!(result.is_err());
    }

    #[test]
    fn receive_message_uses_type_field() {
        let message = ChatMessage {
            id: 7,
            username: "bob".into(),
            message: "hi".into(),
            timestamp: "10:00".into(),
            kind: MessageKind::User,
        };
        let value = serde_json::to_value(ServerEvent::ReceiveMessage(message)).unwrap();
        assert_eq!(
            value,
            json!({
                "event": "receive_message",
                "data": {"id": 7, "username": "bob", "message": "hi", "timestamp": "10:00", "type": "user"}
            })
        );
    }

    #[test]
    fn message_deleted_carries_only_the_id() {
        let value = serde_json::to_value(ServerEvent::MessageDeleted { id: 3 }).unwrap();
        assert_eq!(value, json!({"event": "message_deleted", "data": {"id": 3}}));
    }

    #[test]
    fn system_messages_are_authored_by_system() {
        let message = ChatMessage::system(0, "alice joined the chat".into());
        assert_eq!(message.username, SYSTEM_AUTHOR);
        assert_eq!(message.kind, MessageKind::System);
        assert_eq!(message.timestamp.len(), 5);
    }
}
