use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};
use uuid::Uuid;

/// Password gate plus the set of live login tokens.
///
/// Tokens are opaque v4 UUIDs held in memory only; a restart logs everyone out.
#[derive(Clone)]
pub struct SessionService {
    password: Arc<str>,
    tokens: Arc<Mutex<HashSet<String>>>,
}

impl SessionService {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: Arc::from(password.into()),
            tokens: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Issues a new token when `password` matches, `None` otherwise.
    pub fn login(&self, password: &str) -> Option<String> {
        if password != &*self.password {
            warn!("rejected login attempt with wrong password");
            return None;
        }
        let token = Uuid::new_v4().simple().to_string();
        self.lock().insert(token.clone());
        info!("session opened");
        Some(token)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        !token.is_empty() && self.lock().contains(token)
    }

    pub fn logout(&self, token: &str) {
        if self.lock().remove(token) {
            info!("session closed");
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_issues_a_valid_token() {
        let sessions = SessionService::new("secret");
        let token = sessions.login("secret").expect("token");
        assert!(sessions.is_valid(&token));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let sessions = SessionService::new("secret");
        assert!(sessions.login("Secret").is_none());
        assert!(sessions.login("").is_none());
    }

    #[test]
    fn tokens_are_unique_and_logout_revokes_only_one() {
        let sessions = SessionService::new("secret");
        let a = sessions.login("secret").unwrap();
        let b = sessions.login("secret").unwrap();
        assert_ne!(a, b);

        sessions.logout(&a);
        assert!(!sessions.is_valid(&a));
        assert!(sessions.is_valid(&b));
    }

    #[test]
    fn empty_and_unknown_tokens_are_invalid() {
        let sessions = SessionService::new("secret");
        assert!(!sessions.is_valid(""));
        assert!(!sessions.is_valid("deadbeef"));
    }
}
