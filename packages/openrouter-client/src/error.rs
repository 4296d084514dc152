//! Error types for the OpenRouter client.

use thiserror::Error;

/// Result type for OpenRouter client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// OpenRouter client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error (missing API key, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection failed, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// API error (non-2xx response)
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Parse error (invalid JSON, unexpected response format)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Rate limiting (429) and network-level failures are transient;
    /// everything else is surfaced immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network(_) | ClientError::Api { status: 429, .. }
        )
    }

    /// HTTP status of an API error, if this is one.
    pub fn api_status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
