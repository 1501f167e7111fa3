use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Top-level application error.
/// Every variant renders to the human-readable text sent back to clients.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Username is required")]
    UsernameRequired,

    #[error("Username and message are required")]
    MessageFieldsRequired,

    // ── Protocol errors ──────────────────────────────────────────────────────
    #[error("Invalid event: {0}")]
    InvalidEvent(#[source] serde_json::Error),

    // ── Access errors ────────────────────────────────────────────────────────
    #[error("Not authenticated")]
    Unauthorized,

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::UsernameRequired | AppError::MessageFieldsRequired | AppError::InvalidEvent(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        if self.is_validation() {
            StatusCode::BAD_REQUEST
        } else if matches!(self, AppError::Unauthorized) {
            StatusCode::UNAUTHORIZED
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        assert_eq!(AppError::UsernameRequired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::MessageFieldsRequired.status(), StatusCode::BAD_REQUEST);
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(AppError::InvalidEvent(parse).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unauthorized_and_unexpected_statuses() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::Unexpected("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_match_what_clients_see() {
        assert_eq!(AppError::UsernameRequired.to_string(), "Username is required");
        assert_eq!(
            AppError::MessageFieldsRequired.to_string(),
            "Username and message are required"
        );
    }
}
