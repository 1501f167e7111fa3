mod api;
mod client;
mod components;
mod conversation;
mod models;
mod session;
mod state;
mod typing;
mod ws;

use leptos::mount::mount_to_body;
use leptos::prelude::*;

use components::chat::ChatArea;
use components::join::JoinModal;
use state::AppState;

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    // Connect on mount; history replay arrives before the user joins.
    state.connect();

    view! {
        <div class="app-container">
            <ChatArea />
            <JoinModal />
            <audio node_ref=state.sound src="/notification.wav" preload="auto"></audio>
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
