//! Error types for the job client.

use std::time::Duration;

/// Errors that can occur while talking to the generation service.
#[derive(Debug, thiserror::Error)]
pub enum JobClientError {
    /// The service answered with a non-success status.
    ///
    /// `message` is the `detail` field of the error body when present,
    /// otherwise a fixed per-operation default.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Human-readable failure message.
        message: String,
    },

    /// Request rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Client-side polling gave up.
    #[error("job did not finish within {0:?}")]
    Timeout(Duration),

    /// Invalid client configuration (e.g. malformed base URL).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O error (e.g., reading an image or saving a video).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobClientError {
    /// Returns the HTTP status for `Api` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for errors raised by the service rather than the transport.
    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

/// Result type alias for job client operations.
pub type Result<T> = std::result::Result<T, JobClientError>;

/// Picks the human-readable message out of an error body.
///
/// Uses `detail` when the body is a JSON object carrying a non-empty string
/// there, otherwise `default`.
pub(crate) fn error_message(body: &[u8], default: &str) -> String {
    let value: serde_json::Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            if !body.is_empty() {
                tracing::warn!(error = %e, "error response body is not JSON");
            }
            return default.to_string();
        }
    };

    match value.get("detail").and_then(|d| d.as_str()) {
        Some(detail) if !detail.is_empty() => detail.to_string(),
        _ => default.to_string(),
    }
}

/// Converts a non-success response into an `Api` error.
pub(crate) async fn api_error(response: reqwest::Response, default: &str) -> JobClientError {
    let status = response.status().as_u16();
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(status, error = %e, "failed to read error response body");
            Default::default()
        }
    };
    let message = error_message(&body, default);
    tracing::debug!(status, %message, "request failed");
    JobClientError::Api { status, message }
}
