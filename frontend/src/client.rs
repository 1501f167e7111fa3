//! The page's behaviour, free of the browser.
//!
//! `ChatClient` reacts to user input, the typing timer and the real-time
//! channel, and answers each with an [`Outcome`]: what to put on the wire,
//! whether to ring, what to do with the idle timer and when to reconnect.
//! `AppState` carries the outcome out against the DOM and the socket.

use crate::conversation::MessageLog;
use crate::models::{ClientEvent, ServerEvent};
use crate::session::Session;
use crate::typing::{TimerToken, TypingDebounce, TypingTransition};

const RECONNECT_BASE_MS: u32 = 500;
const RECONNECT_MAX_MS: u32 = 10_000;

/// What to do with the typing idle timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdleTimer {
    #[default]
    Keep,
    Arm(TimerToken),
    Cancel,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Events for the socket, in order.
    pub emit: Vec<ClientEvent>,
    pub notify: bool,
    pub idle_timer: IdleTimer,
    pub reconnect_in_ms: Option<u32>,
}

/// Channel bookkeeping. Joins and messages made while the socket is down
/// wait in `outbox`; typing signals are only meaningful live and are dropped.
#[derive(Clone, Debug, Default)]
struct Link {
    open: bool,
    rejoin: bool,
    outbox: Vec<ClientEvent>,
    failures: u32,
}

impl Link {
    fn next_delay_ms(&mut self) -> u32 {
        let delay = RECONNECT_BASE_MS
            .saturating_mul(1 << self.failures.min(5))
            .min(RECONNECT_MAX_MS);
        self.failures += 1;
        delay
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChatClient {
    session: Session,
    log: MessageLog,
    debounce: TypingDebounce,
    typing_notice: Option<String>,
    draft: String,
    link: Link,
}

impl ChatClient {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn typing_notice(&self) -> Option<&str> {
        self.typing_notice.as_deref()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Join with the typed display name. `None` when the input is rejected.
    pub fn join(&mut self, input: &str) -> Option<Outcome> {
        let event = self.session.join(input)?;
        let mut outcome = Outcome::default();
        self.route(event, &mut outcome);
        Some(outcome)
    }

    /// The message input changed.
    pub fn input(&mut self, value: String) -> Outcome {
        self.draft = value;
        let mut outcome = Outcome::default();
        if !self.session.is_joined() {
            return outcome;
        }
        let step = self.debounce.input();
        self.announce(step.emit, &mut outcome);
        outcome.idle_timer = IdleTimer::Arm(step.arm);
        outcome
    }

    /// Send the draft, clear it, then stop typing without waiting for the timer.
    pub fn send(&mut self) -> Outcome {
        let mut outcome = Outcome::default();
        let Some(event) = self.session.compose(&self.draft) else {
            return outcome;
        };
        self.route(event, &mut outcome);
        self.draft.clear();

        let stopped = self.debounce.message_sent();
        self.announce(stopped, &mut outcome);
        outcome.idle_timer = IdleTimer::Cancel;
        outcome
    }

    /// The idle timer armed with `token` fired.
    pub fn idle_elapsed(&mut self, token: TimerToken) -> Outcome {
        let mut outcome = Outcome::default();
        let stopped = self.debounce.idle_elapsed(token);
        self.announce(stopped, &mut outcome);
        outcome
    }

    pub fn receive(&mut self, event: ServerEvent) -> Outcome {
        let mut outcome = Outcome::default();
        match event {
            ServerEvent::ReceiveMessage(message) => {
                let receipt = self.log.receive(message, self.session.username());
                outcome.notify = receipt.notify;
            }
            ServerEvent::MessageDeleted { id } => {
                let removed = self.log.delete(id);
                log::debug!("message_deleted {id} (removed: {removed})");
            }
            ServerEvent::UserTyping { username } => {
                self.typing_notice = Some(format!("{username} is typing..."));
            }
            ServerEvent::UserStopTyping { .. } => self.typing_notice = None,
            ServerEvent::UserJoined { username } => log::info!("{username} joined"),
            ServerEvent::UserLeft { username } => log::info!("{username} left"),
            ServerEvent::Error { message } => log::warn!("Server rejected event: {message}"),
        }
        outcome
    }

    /// The socket opened. A joined viewer is re-announced, then queued events flush.
    pub fn opened(&mut self) -> Outcome {
        self.link.open = true;
        self.link.failures = 0;

        let mut outcome = Outcome::default();
        if std::mem::take(&mut self.link.rejoin) {
            if let Some(username) = self.session.username() {
                outcome.emit.push(ClientEvent::JoinChat { username: username.to_string() });
            }
        }
        outcome.emit.append(&mut self.link.outbox);
        outcome
    }

    /// The socket closed or never opened. Schedules the next attempt.
    pub fn closed(&mut self) -> Outcome {
        self.link.open = false;
        let join_queued = self
            .link
            .outbox
            .iter()
            .any(|event| matches!(event, ClientEvent::JoinChat { .. }));
        self.link.rejoin = self.session.is_joined() && !join_queued;

        // Nobody can see our typing any more, and theirs is unknown.
        let _ = self.debounce.message_sent();
        self.typing_notice = None;

        Outcome {
            idle_timer: IdleTimer::Cancel,
            reconnect_in_ms: Some(self.link.next_delay_ms()),
            ..Outcome::default()
        }
    }

    /// The socket refused `event`; keep it for the next connection.
    pub fn undelivered(&mut self, event: ClientEvent) {
        if !is_transient(&event) {
            self.link.outbox.push(event);
        }
    }

    fn announce(&mut self, transition: Option<TypingTransition>, outcome: &mut Outcome) {
        let Some(transition) = transition else {
            return;
        };
        let started = transition == TypingTransition::Started;
        if let Some(event) = self.session.typing_event(started) {
            self.route(event, outcome);
        }
    }

    fn route(&mut self, event: ClientEvent, outcome: &mut Outcome) {
        if self.link.open {
            outcome.emit.push(event);
        } else {
            self.undelivered(event);
        }
    }
}

fn is_transient(event: &ClientEvent) -> bool {
    matches!(event, ClientEvent::Typing { .. } | ClientEvent::StopTyping { .. })
}
