//! The visible message list and how each message is presented to the viewer.

use crate::models::{ChatMessage, MessageKind};

/// Bubble styling relative to the viewer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bubble {
    System,
    Sent,
    Received,
}

impl Bubble {
    pub fn classify(message: &ChatMessage, viewer: Option<&str>) -> Self {
        match message.kind {
            MessageKind::System => Bubble::System,
            MessageKind::User if viewer == Some(message.username.as_str()) => Bubble::Sent,
            MessageKind::User => Bubble::Received,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Bubble::System => "message system",
            Bubble::Sent => "message sent",
            Bubble::Received => "message received",
        }
    }
}

/// One rendered row, keyed by the server-assigned message id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageEntry {
    pub id: u64,
    pub author: String,
    pub text: String,
    pub timestamp: String,
    pub bubble: Bubble,
}

impl MessageEntry {
    /// Received messages carry an author header; own and system ones don't.
    pub fn shows_author(&self) -> bool {
        self.bubble == Bubble::Received
    }

    /// Only the viewer's own user messages get a delete control.
    pub fn deletable(&self) -> bool {
        self.bubble == Bubble::Sent
    }
}

/// What a receipt asks of the page beyond appending the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub notify: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageLog {
    entries: Vec<MessageEntry>,
}

impl MessageLog {
    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    /// Appends exactly one row for this receipt.
    ///
    /// `viewer` is `None` until the user has joined; messages arriving before
    /// that (the history replay) never ring the notification. A message that is
    /// already shown (replayed again after a reconnect) keeps its row and stays
    /// silent. A different message under a known id means the server started
    /// over, so the stale row is dropped first.
    pub fn receive(&mut self, message: ChatMessage, viewer: Option<&str>) -> Receipt {
        let bubble = Bubble::classify(&message, viewer);
        if let Some(pos) = self.entries.iter().position(|e| e.id == message.id) {
            let known = &mut self.entries[pos];
            if known.author == message.username
                && known.text == message.message
                && known.timestamp == message.timestamp
            {
                known.bubble = bubble;
                return Receipt { notify: false };
            }
            self.entries.remove(pos);
        }

        let notify = viewer.is_some() && bubble == Bubble::Received;
        self.entries.push(MessageEntry {
            id: message.id,
            author: message.username,
            text: message.message,
            timestamp: message.timestamp,
            bubble,
        });
        Receipt { notify }
    }

    /// Drops the row tagged `id`. Unknown ids are a no-op; returns whether a row went away.
    pub fn delete(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        before != self.entries.len()
    }
}
