use serde::{Deserialize, Serialize};

/// Matches the backend `MessageKind`.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    System,
    User,
}

/// Matches the backend `ChatMessage`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub username: String,
    pub message: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

/// Event sent to the server over the WebSocket.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    JoinChat { username: String },
    SendMessage { username: String, message: String },
    Typing { username: String },
    StopTyping { username: String },
}

/// Event received from the server.
/// Events this client does not render still parse, so they can be skipped quietly.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ReceiveMessage(ChatMessage),
    MessageDeleted { id: u64 },
    UserTyping { username: String },
    UserStopTyping {
        #[serde(default)]
        username: Option<String>,
    },
    UserJoined { username: String },
    UserLeft { username: String },
    Error { message: String },
}

/// Body of `POST /delete`.
#[derive(Clone, Debug, Serialize)]
pub struct DeleteRequest {
    pub id: u64,
}
