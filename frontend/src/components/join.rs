use leptos::ev;
use leptos::prelude::*;

use crate::state::AppState;

/// Display-name prompt shown until the user joins.
#[component]
pub fn JoinModal() -> impl IntoView {
    let state = expect_context::<AppState>();
    let (name, set_name) = signal(String::new());

    let join = move || {
        if state.join(&name.get_untracked()) {
            set_name.set(String::new());
        }
    };

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" {
            ev.prevent_default();
            join();
        }
    };

    view! {
        <Show when=move || !state.client.with(|c| c.session().is_joined())>
            <div class="modal-backdrop">
                <div class="modal-card">
                    <h2>"Choose a display name"</h2>
                    <input
                        type="text"
                        placeholder="Your name"
                        prop:value=name
                        on:input=move |ev| set_name.set(event_target_value(&ev))
                        on:keydown=on_keydown
                    />
                    <button class="join-btn" on:click=move |_| join()>
                        "Join chat"
                    </button>
                </div>
            </div>
        </Show>
    }
}
