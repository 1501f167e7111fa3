//! Password gate: login form, logout, and the session extractor.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::errors::AppError;
use crate::state::AppState;

pub const COOKIE_NAME: &str = "kashif_session";

/// Matches the lifetime of a "permanent" browser session.
const SESSION_MAX_AGE_DAYS: i64 = 31;

// =============================================================================
// SESSION EXTRACTOR
// =============================================================================

/// A request carrying a valid login cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthSession;

impl<S> FromRequestParts<S> for AuthSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let state = AppState::from_ref(state);
        session_token(&jar, &state)
            .map(|_| Self)
            .ok_or(AppError::Unauthorized)
    }
}

/// The cookie's token when it names a live session.
pub fn session_token(jar: &CookieJar, state: &AppState) -> Option<String> {
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|token| state.sessions.is_valid(token))
        .map(str::to_owned)
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    password: String,
}

/// GET `/login`
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if session_token(&jar, &state).is_some() {
        return Redirect::to("/chat").into_response();
    }
    render_login(None).into_response()
}

/// POST `/login` — checks the shared password and opens a session.
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let Some(token) = state.sessions.login(&form.password) else {
        return render_login(Some("Incorrect password. Please try again.")).into_response();
    };

    let cookie = Cookie::build((COOKIE_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(Duration::days(SESSION_MAX_AGE_DAYS));

    (jar.add(cookie), Redirect::to("/chat")).into_response()
}

/// GET `/logout`
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(token) = jar.get(COOKIE_NAME).map(Cookie::value) {
        state.sessions.logout(token);
    }
    let jar = jar.remove(Cookie::build(COOKIE_NAME).path("/"));
    (jar, Redirect::to("/login")).into_response()
}

fn render_login(notice: Option<&str>) -> Html<String> {
    let notice = notice
        .map(|text| format!(r#"<div class="notice error">{text}</div>"#))
        .unwrap_or_default();
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>KashifChat - Login</title>
    <link rel="stylesheet" href="/style.css">
</head>
<body class="login-page">
    <form class="login-card" method="post" action="/login">
        <h1>KashifChat</h1>
        {notice}
        <input type="password" name="password" placeholder="Chat password" autofocus required>
        <button type="submit">Enter</button>
    </form>
</body>
</html>"#
    ))
}
