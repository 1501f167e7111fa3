use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::errors::AppError;
use crate::routes::auth::session_token;
use crate::state::AppState;

/// GET `/` — send logged-in visitors to the chat, everyone else to the login form.
pub async fn index_handler(State(state): State<AppState>, jar: CookieJar) -> Redirect {
    if session_token(&jar, &state).is_some() {
        Redirect::to("/chat")
    } else {
        Redirect::to("/login")
    }
}

/// GET `/chat` — the frontend shell, only for logged-in visitors.
pub async fn chat_page_handler(State(state): State<AppState>, jar: CookieJar) -> Response {
    if session_token(&jar, &state).is_none() {
        return Redirect::to("/login").into_response();
    }

    let index = state.config.frontend_dist.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to read {}: {e}", index.display());
            AppError::Unexpected("frontend bundle is missing".to_string()).into_response()
        }
    }
}
