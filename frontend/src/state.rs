use gloo_timers::callback::Timeout;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen_futures::JsFuture;

use crate::client::{ChatClient, IdleTimer, Outcome};
use crate::models::ServerEvent;
use crate::typing::{IDLE_TIMEOUT_MS, TimerToken};
use crate::ws::ChatSocket;

/// Shared page state, provided via Leptos context.
///
/// All fields are arena handles, so the whole struct is `Copy` and can be
/// moved into any event handler or timer callback.
#[derive(Clone, Copy)]
pub struct AppState {
    // --- Rendered state ---
    pub client: RwSignal<ChatClient>,

    // --- DOM handles ---
    pub sound: NodeRef<html::Audio>,
    pub list: NodeRef<html::Div>,

    // --- Browser-only resources ---
    socket: StoredValue<Option<ChatSocket>, LocalStorage>,
    idle_timer: StoredValue<Option<Timeout>, LocalStorage>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let state = Self {
            client: RwSignal::new(ChatClient::default()),
            sound: NodeRef::new(),
            list: NodeRef::new(),
            socket: StoredValue::new_local(None),
            idle_timer: StoredValue::new_local(None),
        };

        provide_context(state);
        state
    }

    /// Open the real-time channel; inbound events update the page.
    pub fn connect(&self) {
        let state = *self;
        let socket = ChatSocket::connect(
            move || state.on_open(),
            move |event| state.on_server_event(event),
            move || state.on_close(),
        );
        match socket {
            Ok(socket) => self.socket.set_value(Some(socket)),
            Err(e) => {
                log::error!("Could not open chat channel: {e}");
                self.on_close();
            }
        }
    }

    /// Join with the typed display name. Returns whether the name was accepted.
    pub fn join(&self, input: &str) -> bool {
        match self.client.try_update(|c| c.join(input)).flatten() {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    /// Send the current draft.
    pub fn send(&self) {
        self.update(ChatClient::send);
    }

    /// The message input changed.
    pub fn on_input(&self, value: String) {
        self.update(move |c| c.input(value));
    }

    fn on_idle(&self, token: TimerToken) {
        self.update(move |c| c.idle_elapsed(token));
    }

    fn on_server_event(&self, event: ServerEvent) {
        self.update(move |c| c.receive(event));
    }

    fn on_open(&self) {
        self.update(ChatClient::opened);
    }

    fn on_close(&self) {
        self.update(ChatClient::closed);
    }

    fn update(&self, step: impl FnOnce(&mut ChatClient) -> Outcome) {
        if let Some(outcome) = self.client.try_update(step) {
            self.apply(outcome);
        }
    }

    fn apply(&self, outcome: Outcome) {
        for event in outcome.emit {
            let sent = self
                .socket
                .with_value(|socket| socket.as_ref().is_some_and(|s| s.emit(&event)));
            if !sent {
                self.client.update_untracked(|c| c.undelivered(event));
            }
        }

        if outcome.notify {
            self.play_notification();
        }

        // Replacing the stored handle drops, and so cancels, the previous timer.
        match outcome.idle_timer {
            IdleTimer::Keep => {}
            IdleTimer::Arm(token) => {
                let state = *self;
                let timer = Timeout::new(IDLE_TIMEOUT_MS, move || state.on_idle(token));
                self.idle_timer.set_value(Some(timer));
            }
            IdleTimer::Cancel => self.idle_timer.set_value(None),
        }

        // Every close schedules exactly one attempt, so retries never overlap.
        if let Some(delay) = outcome.reconnect_in_ms {
            log::info!("Reconnecting in {delay} ms");
            let state = *self;
            Timeout::new(delay, move || state.connect()).forget();
        }
    }

    fn play_notification(&self) {
        let Some(audio) = self.sound.get_untracked() else {
            return;
        };
        match audio.play() {
            // Autoplay policies may still reject the promise; that is not an error for us.
            Ok(promise) => spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    log::debug!("Notification sound blocked: {e:?}");
                }
            }),
            Err(e) => log::debug!("Notification sound unavailable: {e:?}"),
        }
    }
}
