//! Server configuration.

use std::time::Duration;

use crate::state::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_TTL, SessionStore};

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// How long an untouched session keeps its pending question
    pub session_ttl: Duration,
    /// Upper bound on sessions held in memory
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            session_ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("KAABIL_HOST").unwrap_or(defaults.host),
            port: lookup("KAABIL_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            session_ttl: lookup("KAABIL_SESSION_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_ttl),
            max_sessions: lookup("KAABIL_MAX_SESSIONS")
                .and_then(|s| s.parse().ok())
                .filter(|max| *max > 0)
                .unwrap_or(defaults.max_sessions),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(self.session_ttl, self.max_sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config.bind_address(), "127.0.0.1:8501");
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
        assert_eq!(config.max_sessions, 10_000);
    }

    #[test]
    fn reads_session_limits() {
        let config = ServerConfig::from_lookup(|key| match key {
            "KAABIL_PORT" => Some("9000".into()),
            "KAABIL_SESSION_TTL_SECS" => Some("120".into()),
            "KAABIL_MAX_SESSIONS" => Some("50".into()),
            _ => None,
        });
        assert_eq!(config.port, 9000);
        assert_eq!(config.session_ttl, Duration::from_secs(120));
        assert_eq!(config.max_sessions, 50);
    }

    #[test]
    fn zero_limits_fall_back_to_defaults() {
        let config = ServerConfig::from_lookup(|key| match key {
            "KAABIL_SESSION_TTL_SECS" | "KAABIL_MAX_SESSIONS" => Some("0".into()),
            _ => None,
        });
        assert_eq!(config.session_ttl, DEFAULT_SESSION_TTL);
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
    }
}
