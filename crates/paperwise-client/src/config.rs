//! Client configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Backend origin used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL, without the `/api` suffix.
    pub base_url: String,

    /// Optional per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a configuration for the given backend origin.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// - `PAPERWISE_API_URL`: backend origin (default: `http://localhost:5000`)
    /// - `PAPERWISE_REQUEST_TIMEOUT_SECS`: request timeout in seconds (default: none)
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("PAPERWISE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let request_timeout = match std::env::var("PAPERWISE_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!(
                        "PAPERWISE_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                        raw
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            Err(_) => None,
        };

        Ok(Self {
            base_url,
            request_timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
