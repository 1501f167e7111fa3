//! Typing-indicator debounce.
//!
//! The first keystroke announces "typing"; every keystroke re-arms a one
//! second idle timer; the timer (or an explicit send) announces "stopped".
//! The machine only decides what to emit. The caller owns the real timer and
//! passes back the [`TimerToken`] it was armed with, so an expiry from a
//! superseded timer is ignored.

/// Idle gap after the last keystroke before "stopped typing" is sent.
pub const IDLE_TIMEOUT_MS: u32 = 1_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TypingState {
    #[default]
    Idle,
    Typing,
}

/// What the caller should emit on the channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypingTransition {
    Started,
    Stopped,
}

/// Identifies one arming of the idle timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerToken(u64);

/// Result of a keystroke: an optional announcement plus the timer to (re)arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputStep {
    pub emit: Option<TypingTransition>,
    pub arm: TimerToken,
}

#[derive(Clone, Debug, Default)]
pub struct TypingDebounce {
    state: TypingState,
    generation: u64,
}

impl TypingDebounce {
    #[cfg(test)]
    pub fn state(&self) -> TypingState {
        self.state
    }

    /// Input changed. Any previously armed timer is superseded.
    pub fn input(&mut self) -> InputStep {
        let emit = match self.state {
            TypingState::Idle => {
                self.state = TypingState::Typing;
                Some(TypingTransition::Started)
            }
            TypingState::Typing => None,
        };
        InputStep { emit, arm: self.rearm() }
    }

    /// The idle timer armed with `token` fired.
    pub fn idle_elapsed(&mut self, token: TimerToken) -> Option<TypingTransition> {
        if token.0 != self.generation {
            return None;
        }
        self.stop()
    }

    /// A message was sent; stop right away and invalidate the pending timer.
    pub fn message_sent(&mut self) -> Option<TypingTransition> {
        self.rearm();
        self.stop()
    }

    fn stop(&mut self) -> Option<TypingTransition> {
        match self.state {
            TypingState::Typing => {
                self.state = TypingState::Idle;
                Some(TypingTransition::Stopped)
            }
            TypingState::Idle => None,
        }
    }

    fn rearm(&mut self) -> TimerToken {
        self.generation = self.generation.wrapping_add(1);
        TimerToken(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_keystroke_starts_typing_once() {
        let mut debounce = TypingDebounce::default();
        let first = debounce.input();
        assert_eq!(first.emit, Some(TypingTransition::Started));
        for _ in 0..20 {
            assert_eq!(debounce.input().emit, None);
        }
        assert_eq!(debounce.state(), TypingState::Typing);
    }

    #[test]
    fn only_the_latest_timer_stops_typing() {
        let mut debounce = TypingDebounce::default();
        let stale = debounce.input().arm;
        let latest = debounce.input().arm;

        assert_eq!(debounce.idle_elapsed(stale), None);
        assert_eq!(debounce.state(), TypingState::Typing);
        assert_eq!(debounce.idle_elapsed(latest), Some(TypingTransition::Stopped));
        assert_eq!(debounce.idle_elapsed(latest), None);
    }

    #[test]
    fn idle_gap_allows_a_new_start() {
        let mut debounce = TypingDebounce::default();
        let token = debounce.input().arm;
        debounce.idle_elapsed(token);
        assert_eq!(debounce.input().emit, Some(TypingTransition::Started));
    }

    #[test]
    fn send_stops_immediately_and_voids_pending_timer() {
        let mut debounce = TypingDebounce::default();
        let pending = debounce.input().arm;

        assert_eq!(debounce.message_sent(), Some(TypingTransition::Stopped));
        assert_eq!(debounce.idle_elapsed(pending), None);
        assert_eq!(debounce.message_sent(), None);
    }

    #[test]
    fn send_then_type_is_eventually_stopped() {
        let mut debounce = TypingDebounce::default();
        debounce.input();
        debounce.message_sent();

        let step = debounce.input();
        assert_eq!(step.emit, Some(TypingTransition::Started));
        assert_eq!(debounce.idle_elapsed(step.arm), Some(TypingTransition::Stopped));
    }

    #[test]
    fn idle_timer_without_typing_is_silent() {
        let mut debounce = TypingDebounce::default();
        let step = debounce.input();
        debounce.message_sent();
        assert_eq!(debounce.idle_elapsed(step.arm), None);
        assert_eq!(debounce.state(), TypingState::Idle);
    }
}
