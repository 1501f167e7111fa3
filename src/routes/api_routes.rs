use axum::extract::State;
use axum::Json;
use tracing::debug;

use crate::models::{DeleteRequest, DeleteResponse};
use crate::routes::auth::AuthSession;
use crate::state::AppState;

/// POST `/delete` — removes a message and tells every client to drop it.
pub async fn delete_handler(
    _session: AuthSession,
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Json<DeleteResponse> {
    let removed = state.chat.delete_message(request.id);
    debug!(id = request.id, removed, remaining = state.chat.message_count(), "delete requested");
    Json(DeleteResponse::deleted())
}
