use std::env;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_DB_URL: &str = "sqlite://exam-desk.sqlite3";
pub const DEFAULT_AUTOSAVE_MS: u64 = 1_000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime settings for the client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub db_url: String,
    pub autosave_debounce: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            db_url: DEFAULT_DB_URL.to_string(),
            autosave_debounce: Duration::from_millis(DEFAULT_AUTOSAVE_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `EXAM_API_URL`, `EXAM_DB_URL`, `EXAM_AUTOSAVE_MS`
    /// and `EXAM_REQUEST_TIMEOUT_SECS`. Blank or unparsable values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();
        if let Some(url) = read("EXAM_API_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = read("EXAM_DB_URL") {
            config.db_url = url;
        }
        if let Some(ms) = read("EXAM_AUTOSAVE_MS").and_then(|v| v.trim().parse().ok()) {
            config.autosave_debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = read("EXAM_REQUEST_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_db_url(mut self, url: impl Into<String>) -> Self {
        self.db_url = url.into();
        self
    }

    #[must_use]
    pub fn with_autosave_debounce(mut self, debounce: Duration) -> Self {
        self.autosave_debounce = debounce;
        self
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
