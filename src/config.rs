use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_PASSWORD: &str = "24446666678910";
const DEFAULT_FRONTEND_DIST: &str = "frontend/dist";
const DEFAULT_HISTORY_REPLAY: usize = 50;
const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Runtime settings, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Shared password that unlocks the chat.
    pub chat_password: String,
    /// Marks the session cookie `Secure`; enable behind HTTPS.
    pub cookie_secure: bool,
    /// Directory holding the built frontend (`index.html` plus wasm bundle).
    pub frontend_dist: PathBuf,
    /// How many recent messages a fresh connection receives.
    pub history_replay: usize,
    /// Maximum messages kept in memory.
    pub history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            chat_password: DEFAULT_PASSWORD.to_string(),
            cookie_secure: false,
            frontend_dist: PathBuf::from(DEFAULT_FRONTEND_DIST),
            history_replay: DEFAULT_HISTORY_REPLAY,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("PORT").unwrap_or(defaults.port),
            chat_password: std::env::var("CHAT_PASSWORD").unwrap_or(defaults.chat_password),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(defaults.cookie_secure),
            frontend_dist: std::env::var("FRONTEND_DIST")
                .map(PathBuf::from)
                .unwrap_or(defaults.frontend_dist),
            history_replay: env_parse("HISTORY_REPLAY").unwrap_or(defaults.history_replay),
            history_limit: env_parse("HISTORY_LIMIT")
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.history_limit),
        }
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unique variable names per test so parallel tests never race.

    #[test]
    fn env_bool_accepts_common_spellings() {
        for (i, (raw, expected)) in [("1", true), (" Yes ", true), ("off", false), ("FALSE", false)]
            .into_iter()
            .enumerate()
        {
            let key = format!("__KASHIF_TEST_BOOL_{i}__");
            std::env::set_var(&key, raw);
            assert_eq!(env_bool(&key), Some(expected), "value {raw:?}");
            std::env::remove_var(&key);
        }
    }

    #[test]
    fn env_bool_rejects_garbage() {
        let key = "__KASHIF_TEST_BOOL_GARBAGE__";
        std::env::set_var(key, "maybe");
        assert_eq!(env_bool(key), None);
        std::env::remove_var(key);
        assert_eq!(env_bool("__KASHIF_TEST_BOOL_UNSET__"), None);
    }

    #[test]
    fn env_parse_ignores_unparsable_values() {
        let key = "__KASHIF_TEST_PORT__";
        std::env::set_var(key, "not-a-port");
        assert_eq!(env_parse::<u16>(key), None);
        std::env::set_var(key, " 8081 ");
        assert_eq!(env_parse::<u16>(key), Some(8081));
        std::env::remove_var(key);
    }

    #[test]
    fn defaults_match_the_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.history_replay, 50);
        assert_eq!(config.history_limit, 1000);
        assert!(!config.cookie_secure);
    }
}
