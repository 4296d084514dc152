//! Typed errors for the ingestion pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Internal layers (`SecurityError`,
//! `FetchError`, `ExtractError`) are recovered or mapped into the boundary
//! [`ApiError`], which carries the wire code and HTTP-equivalent status.

use serde_json::json;
use thiserror::Error;

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Clone, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, internal IPs)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// IP in blocked CIDR range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedCidr(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// DNS resolution failed
    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Errors from outbound fetches.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Security validation failed before the request was sent
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Non-success HTTP status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Network-level failure (connect, TLS, read)
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Request exceeded its deadline
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// Response body exceeded the configured cap
    #[error("response too large (limit {limit} bytes): {url}")]
    TooLarge { url: String, limit: usize },

    /// The caller's request was cancelled
    #[error("fetch cancelled")]
    Cancelled,

    /// Malformed response body
    #[error("bad response body from {url}: {message}")]
    BadBody { url: String, message: String },
}

/// Errors from format-specific extraction.
///
/// Extractors recover from these internally (returning empty content);
/// the type exists so the recovery sites can log what actually failed.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("archive error: {0}")]
    Archive(String),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Wire error codes with their HTTP-equivalent statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    AuthMissing,
    AuthInvalid,
    UrlBlocked,
    RateLimited,
    CreditsExhausted,
    AiError,
    InternalError,
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "invalid_input",
            ErrorCode::AuthMissing => "auth_missing",
            ErrorCode::AuthInvalid => "auth_invalid",
            ErrorCode::UrlBlocked => "url_blocked",
            ErrorCode::RateLimited => "rate_limited",
            ErrorCode::CreditsExhausted => "credits_exhausted",
            ErrorCode::AiError => "ai_error",
            ErrorCode::InternalError => "internal_error",
        }
    }

    /// HTTP-equivalent status.
    pub fn status(&self) -> u16 {
        match self {
            ErrorCode::InvalidInput => 400,
            ErrorCode::AuthMissing | ErrorCode::AuthInvalid => 401,
            ErrorCode::CreditsExhausted => 402,
            ErrorCode::UrlBlocked => 403,
            ErrorCode::RateLimited => 429,
            ErrorCode::AiError => 502,
            ErrorCode::InternalError => 500,
        }
    }
}

/// Boundary error: constructed once at the failure site and propagated
/// unchanged to the caller.
#[derive(Debug, Clone, Error)]
#[error("{}: {message}", .code.as_str())]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Malformed or missing request fields; `details` names each offender.
    pub fn invalid_input(message: impl Into<String>, fields: &[&str]) -> Self {
        Self::new(ErrorCode::InvalidInput, message).with_details(json!(fields))
    }

    pub fn url_blocked(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UrlBlocked, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    pub fn credits_exhausted(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CreditsExhausted, message)
    }

    pub fn ai_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AiError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// HTTP-equivalent status for this error.
    pub fn status(&self) -> u16 {
        self.code.status()
    }

    /// Whether this is an AI-provider quota condition the caller must see.
    pub fn is_quota(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::RateLimited | ErrorCode::CreditsExhausted
        )
    }

    /// Serialize to the wire envelope: `{"error": {code, message, details?}}`.
    pub fn to_envelope(&self) -> serde_json::Value {
        let mut body = json!({
            "code": self.code.as_str(),
            "message": self.message,
        });
        if let Some(details) = &self.details {
            body["details"] = details.clone();
        }
        json!({ "error": body })
    }
}

impl From<SecurityError> for ApiError {
    fn from(err: SecurityError) -> Self {
        ApiError::url_blocked(err.to_string())
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
