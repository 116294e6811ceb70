use std::time::Duration;

/// Default backend base URL for local development.
const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without a trailing slash, e.g. `https://app.example.com/api`.
    pub api_url: String,
    /// Bearer token attached to every request when present.
    pub api_token: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                     |
    /// |---------------------------------|-----------------------------|
    /// | `MENUWISE_API_URL`              | `http://localhost:8000/api` |
    /// | `MENUWISE_API_TOKEN`            | unset                       |
    /// | `MENUWISE_REQUEST_TIMEOUT_SECS` | `30`                        |
    pub fn from_env() -> Self {
        let api_url = std::env::var("MENUWISE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let api_token = std::env::var("MENUWISE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let request_timeout_secs = std::env::var("MENUWISE_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            api_url,
            api_token,
            request_timeout_secs,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            api_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
