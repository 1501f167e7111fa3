use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChatMessage, ServerEvent};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Identifies one WebSocket connection for the lifetime of its socket.
pub type ConnectionId = Uuid;

/// An event on its way to every connected socket.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub event: ServerEvent,
    /// Connection that must not receive this event (its own origin).
    pub skip: Option<ConnectionId>,
}

impl Delivery {
    pub fn is_for(&self, connection: ConnectionId) -> bool {
        self.skip != Some(connection)
    }
}

#[derive(Default)]
struct RoomState {
    messages: VecDeque<ChatMessage>,
    next_id: u64,
    active_users: HashSet<String>,
}

impl RoomState {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// The single in-memory chat room shared by all connections.
///
/// State lives behind a plain mutex that is never held across an `.await`;
/// every mutation publishes its outcome on a broadcast channel, under that
/// same lock, and each socket task forwards the channel to its client.
#[derive(Clone)]
pub struct ChatService {
    state: Arc<Mutex<RoomState>>,
    events: broadcast::Sender<Delivery>,
    history_limit: usize,
    history_replay: usize,
}

impl ChatService {
    pub fn new(history_limit: usize, history_replay: usize) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(RoomState::default())),
            events,
            history_limit: history_limit.max(1),
            history_replay,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Delivery> {
        self.events.subscribe()
    }

    /// Subscribes a new connection and snapshots the replay window in one step.
    ///
    /// Mutations publish while holding the room lock, so every message is
    /// either in the snapshot or arrives on the receiver, never both.
    pub fn attach(&self) -> (broadcast::Receiver<Delivery>, Vec<ChatMessage>) {
        let state = self.lock();
        let events = self.subscribe();
        (events, self.replay_window(&state))
    }

    /// The newest messages a fresh connection is shown, oldest first.
    #[cfg(test)]
    pub fn recent_history(&self) -> Vec<ChatMessage> {
        let state = self.lock();
        self.replay_window(&state)
    }

    /// Registers `username` and announces it. Returns the trimmed name.
    pub fn join(&self, username: &str) -> Result<String, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::UsernameRequired);
        }

        {
            let mut state = self.lock();
            state.active_users.insert(username.to_string());
            let id = state.next_id();
            let message = ChatMessage::system(id, format!("{username} joined the chat"));
            self.store(&mut state, message.clone());
            self.publish(ServerEvent::ReceiveMessage(message), None);
            self.publish(ServerEvent::UserJoined { username: username.to_string() }, None);
        }

        info!("{username} joined the chat");
        Ok(username.to_string())
    }

    /// Stores a user message and broadcasts it to everyone, sender included.
    pub fn post_message(&self, username: &str, message: &str) -> Result<ChatMessage, AppError> {
        let username = username.trim();
        let message = message.trim();
        if username.is_empty() || message.is_empty() {
            return Err(AppError::MessageFieldsRequired);
        }

        let stored = {
            let mut state = self.lock();
            let id = state.next_id();
            let stored = ChatMessage::user(id, username.to_string(), message.to_string());
            self.store(&mut state, stored.clone());
            self.publish(ServerEvent::ReceiveMessage(stored.clone()), None);
            stored
        };

        debug!(id = stored.id, "{username}: {message}");
        Ok(stored)
    }

    /// Relays a typing start/stop to everyone but `origin`. Blank names are dropped.
    pub fn relay_typing(&self, origin: ConnectionId, username: &str, typing: bool) {
        let username = username.trim();
        if username.is_empty() {
            return;
        }
        let username = username.to_string();
        let event = if typing {
            ServerEvent::UserTyping { username }
        } else {
            ServerEvent::UserStopTyping { username }
        };
        self.publish(event, Some(origin));
    }

    /// Drops `username` from the active set, announcing it if it was present.
    pub fn leave(&self, username: &str) {
        let mut state = self.lock();
        if state.active_users.remove(username) {
            self.publish(ServerEvent::UserLeft { username: username.to_string() }, None);
            drop(state);
            info!("{username} left the chat");
        }
    }

    /// Removes every stored message with `id` and tells all clients to drop it.
    /// Unknown ids are still announced. Returns whether anything was removed.
    pub fn delete_message(&self, id: u64) -> bool {
        let removed = {
            let mut state = self.lock();
            let before = state.messages.len();
            state.messages.retain(|m| m.id != id);
            self.publish(ServerEvent::MessageDeleted { id }, None);
            before != state.messages.len()
        };

        debug!(id, removed, "message deleted");
        removed
    }

    /// Number of sockets currently subscribed to room events.
    pub fn connection_count(&self) -> usize {
        self.events.receiver_count()
    }

    #[cfg(test)]
    pub fn is_active(&self, username: &str) -> bool {
        self.lock().active_users.contains(username)
    }

    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    fn replay_window(&self, state: &RoomState) -> Vec<ChatMessage> {
        let skip = state.messages.len().saturating_sub(self.history_replay);
        state.messages.iter().skip(skip).cloned().collect()
    }

    fn store(&self, state: &mut RoomState, message: ChatMessage) {
        state.messages.push_back(message);
        while state.messages.len() > self.history_limit {
            state.messages.pop_front();
        }
    }

    /// Sends never block, so this is safe to call with the room lock held.
    fn publish(&self, event: ServerEvent, skip: Option<ConnectionId>) {
        // No subscribers is fine: nobody is connected yet.
        let _ = self.events.send(Delivery { event, skip });
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
