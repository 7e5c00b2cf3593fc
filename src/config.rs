//! Client configuration.

use crate::error::{JobClientError, Result};
use reqwest::Url;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Environment variable read by [`ClientConfig::from_env`].
pub const BASE_URL_ENV: &str = "SEQVID_API_BASE_URL";

/// Where the generation service lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
}

impl ClientConfig {
    /// Parses and validates a base URL such as `http://localhost:8000/api`.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| JobClientError::Config(format!("invalid base URL {base_url:?}: {e}")))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(JobClientError::Config(format!(
                "base URL must be http or https, got {}",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(JobClientError::Config(format!(
                "base URL cannot carry paths: {base_url}"
            )));
        }

        Ok(Self { base_url })
    }

    /// Reads `SEQVID_API_BASE_URL`, falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        match lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            Some(url) => Self::new(url.trim()),
            None => Ok(Self::default()),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }
}
