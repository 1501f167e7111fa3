use crate::models::ClientEvent;

/// The viewer's chosen display name. Set once by a successful join and kept
/// for the life of the page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn is_joined(&self) -> bool {
        self.username.is_some()
    }

    /// Claims `input` as the display name. Blank input, or a second join,
    /// yields nothing.
    pub fn join(&mut self, input: &str) -> Option<ClientEvent> {
        if self.is_joined() {
            return None;
        }
        let username = input.trim();
        if username.is_empty() {
            return None;
        }
        self.username = Some(username.to_string());
        Some(ClientEvent::JoinChat { username: username.to_string() })
    }

    /// The `send_message` event for `draft`, if there is something to send.
    pub fn compose(&self, draft: &str) -> Option<ClientEvent> {
        let username = self.username.clone()?;
        let message = draft.trim();
        if message.is_empty() {
            return None;
        }
        Some(ClientEvent::SendMessage { username, message: message.to_string() })
    }

    pub fn typing_event(&self, started: bool) -> Option<ClientEvent> {
        let username = self.username.clone()?;
        Some(if started {
            ClientEvent::Typing { username }
        } else {
            ClientEvent::StopTyping { username }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_trims_and_emits_once() {
        let mut session = Session::default();
        assert_eq!(
            session.join("  alice "),
            Some(ClientEvent::JoinChat { username: "alice".into() })
        );
        assert_eq!(session.username(), Some("alice"));
        assert_eq!(session.join("bob"), None);
        assert_eq!(session.username(), Some("alice"));
    }

    #[test]
    fn blank_names_do_not_join() {
        let mut session = Session::default();
        for input in ["", "   ", "\t\n"] {
            assert_eq!(session.join(input), None);
        }
        assert!(!session.is_joined());
    }

    #[test]
    fn compose_requires_a_name_and_text() {
        let mut session = Session::default();
        assert_eq!(session.compose("hello"), None);

        session.join("alice");
        assert_eq!(session.compose("   "), None);
        assert_eq!(
            session.compose(" hello "),
            Some(ClientEvent::SendMessage { username: "alice".into(), message: "hello".into() })
        );
    }

    #[test]
    fn typing_events_carry_the_name() {
        let mut session = Session::default();
        assert_eq!(session.typing_event(true), None);
        session.join("alice");
        assert_eq!(session.typing_event(true), Some(ClientEvent::Typing { username: "alice".into() }));
        assert_eq!(
            session.typing_event(false),
            Some(ClientEvent::StopTyping { username: "alice".into() })
        );
    }
}
