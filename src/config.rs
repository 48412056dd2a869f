//! Client configuration

use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::storage::default_storage_dir;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const API_URL_ENV: &str = "WHEELTRACKER_API_URL";
pub const TIMEOUT_ENV: &str = "WHEELTRACKER_TIMEOUT_SECS";
pub const STORAGE_DIR_ENV: &str = "WHEELTRACKER_STORAGE_DIR";

/// Settings shared by the gateway and the auth store
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Origin every endpoint path is appended to, without a trailing slash
    pub base_url: String,
    /// Deadline applied to a request unless the call overrides it
    pub timeout: Duration,
    pub storage_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            storage_dir: default_storage_dir(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    /// Build from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&base_url);

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!("Ignoring invalid {}={:?}, using {:?}", TIMEOUT_ENV, raw, DEFAULT_TIMEOUT),
            }
        }

        if let Ok(dir) = std::env::var(STORAGE_DIR_ENV) {
            config.storage_dir = PathBuf::from(dir);
        }

        config
    }

    /// Absolute URL for an endpoint path such as `/positions/`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_and_joins_paths() {
        let config = ClientConfig::new("http://example.test/api/");
        assert_eq!(config.base_url, "http://example.test/api");
        assert_eq!(config.url("/positions/"), "http://example.test/api/positions/");
        assert_eq!(config.url("auth/refresh/"), "http://example.test/api/auth/refresh/");
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
