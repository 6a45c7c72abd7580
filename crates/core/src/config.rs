//! Tutor configuration.

use std::time::Duration;

use tracing::warn;

use crate::provider::Provider;

pub const DEFAULT_WINDOW_SECS: f64 = 180.0;
pub const DEFAULT_LANGUAGES: [&str; 2] = ["en", "hi"];

/// Settings shared by every session of one running tutor.
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// Text generation provider
    pub provider: Provider,
    /// Model override; the provider default is used when unset
    pub model: Option<String>,
    /// Endpoint override for OpenAI-compatible servers
    pub api_url: Option<String>,
    /// Transcript language preference, most preferred first
    pub languages: Vec<String>,
    /// Length of the trailing transcript window in seconds
    pub window_secs: f64,
    /// Timeout for a single generation request
    pub request_timeout: Duration,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_url: None,
            languages: DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect(),
            window_secs: DEFAULT_WINDOW_SECS,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl TutorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let provider = match lookup("KAABIL_PROVIDER") {
            Some(name) => name.parse().unwrap_or_else(|e| {
                warn!(error = %e, "Ignoring KAABIL_PROVIDER");
                defaults.provider
            }),
            None => defaults.provider,
        };

        let languages: Vec<String> = lookup("KAABIL_LANGUAGES")
            .map(|s| {
                s.split(',')
                    .map(|lang| lang.trim().to_string())
                    .filter(|lang| !lang.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            provider,
            model: lookup("KAABIL_MODEL").filter(|m| !m.trim().is_empty()),
            api_url: lookup("KAABIL_API_URL").filter(|u| !u.trim().is_empty()),
            languages: if languages.is_empty() {
                defaults.languages
            } else {
                languages
            },
            window_secs: lookup("KAABIL_WINDOW_SECS")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .unwrap_or(defaults.window_secs),
            request_timeout: lookup("KAABIL_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}
