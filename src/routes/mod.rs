pub mod api_routes;
pub mod auth;
pub mod chat_routes;
pub mod ws_routes;

use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let assets = ServeDir::new(&state.config.frontend_dist);

    Router::new()
        // Page routes
        .route("/", get(chat_routes::index_handler))
        .route("/chat", get(chat_routes::chat_page_handler))
        .route("/index.html", get(chat_routes::chat_page_handler))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        // Realtime + API routes
        .route("/ws", get(ws_routes::ws_chat_handler))
        .route("/delete", post(api_routes::delete_handler))
        // Frontend bundle (wasm, js, css, sound)
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
