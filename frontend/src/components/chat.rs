use leptos::ev;
use leptos::prelude::*;

use crate::api;
use crate::conversation::MessageEntry;
use crate::state::AppState;

/// Main chat area: message list, typing indicator, and input.
#[component]
pub fn ChatArea() -> impl IntoView {
    let state = expect_context::<AppState>();

    // Keep the newest message in view.
    let row_count = Memo::new(move |_| state.client.with(|c| c.log().entries().len()));
    Effect::new(move |_| {
        row_count.track();
        if let Some(list) = state.list.get_untracked() {
            list.set_scroll_top(list.scroll_height());
        }
    });

    view! {
        <main class="chat-area">
            <div class="chat-header">
                {move || match state.client.with(|c| c.session().username().map(str::to_owned)) {
                    Some(name) => format!("KashifChat · {name}"),
                    None => "KashifChat".to_string(),
                }}
                <a class="logout-link" href="/logout">"Log out"</a>
            </div>

            <div class="chat-messages" node_ref=state.list>
                <For
                    each=move || state.client.with(|c| c.log().entries().to_vec())
                    key=|entry| entry.id
                    let:entry
                >
                    <MessageRow entry=entry />
                </For>
            </div>

            <TypingIndicator />
            <ChatInput />
        </main>
    }
}

/// A single message bubble.
#[component]
fn MessageRow(entry: MessageEntry) -> impl IntoView {
    let shows_author = entry.shows_author();
    let deletable = entry.deletable();
    let MessageEntry { id, author, text, timestamp, bubble } = entry;

    view! {
        <div class=bubble.css_class() data-id=id.to_string()>
            <div class="message-bubble">
                {shows_author.then(|| view! { <div class="message-header">{author}</div> })}
                <div class="message-text">{text}</div>
                <div class="message-time">{timestamp}</div>
                {deletable.then(|| view! {
                    <button
                        class="delete-btn"
                        title="Delete message"
                        on:click=move |_| api::request_delete(id)
                    >
                        "🗑️"
                    </button>
                })}
            </div>
        </div>
    }
}

#[component]
fn TypingIndicator() -> impl IntoView {
    let state = expect_context::<AppState>();
    let notice = Memo::new(move |_| state.client.with(|c| c.typing_notice().map(str::to_owned)));
    let visible = move || notice.with(Option::is_some);

    view! {
        <div class="typing-indicator" style:display=move || if visible() { "block" } else { "none" }>
            <span class="typing-text">{move || notice.get().unwrap_or_default()}</span>
        </div>
    }
}

/// Message input and send button; both stay disabled until the user joins.
#[component]
fn ChatInput() -> impl IntoView {
    let state = expect_context::<AppState>();
    let locked = move || !state.client.with(|c| c.session().is_joined());

    let on_keydown = move |ev: ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            state.send();
        }
    };

    view! {
        <div class="input-area">
            <div class="input-row">
                <input
                    type="text"
                    placeholder="Type a message..."
                    prop:value=move || state.client.with(|c| c.draft().to_string())
                    on:input=move |ev| state.on_input(event_target_value(&ev))
                    on:keydown=on_keydown
                    disabled=locked
                />
                <button class="send-btn" on:click=move |_| state.send() disabled=locked>
                    "Send"
                </button>
            </div>
        </div>
    }
}
