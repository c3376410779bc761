//! Client configuration loaded from environment variables.

use std::path::PathBuf;
use std::time::Duration;

/// Client configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DINE_API_URL`: backend base URL (default: `"http://localhost:3000"`)
/// - `DINE_SESSION_FILE`: where the session is kept (default: `".dine-session.json"`)
/// - `DINE_POLL_INTERVAL_SECS`: base status polling interval (default: `30`)
/// - `DINE_HTTP_TIMEOUT_SECS`: per-request timeout (default: `10`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|&secs| secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            api_url: lookup("DINE_API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_url),
            session_file: lookup("DINE_SESSION_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            poll_interval: secs("DINE_POLL_INTERVAL_SECS", defaults.poll_interval),
            http_timeout: secs("DINE_HTTP_TIMEOUT_SECS", defaults.http_timeout),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:3000".to_string(),
            session_file: PathBuf::from(".dine-session.json"),
            poll_interval: Duration::from_secs(30),
            http_timeout: Duration::from_secs(10),
            log_level: "info".to_string(),
        }
    }
}
