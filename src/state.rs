use std::sync::Arc;

use crate::config::Config;
use crate::service::chat_service::ChatService;
use crate::service::session_service::SessionService;

/// Shared router state; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub chat: ChatService,
    pub sessions: SessionService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            chat: ChatService::new(config.history_limit, config.history_replay),
            sessions: SessionService::new(config.chat_password.clone()),
            config: Arc::new(config),
        }
    }
}
