//! Error types for background editing.

use std::time::Duration;

/// Errors that can occur while editing an image.
#[derive(Debug, thiserror::Error)]
pub enum BackdropError {
    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Billing is not enabled for the API key.
    #[error("billing error: {0}")]
    Billing(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Sanitized response body.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Server-suggested wait before retrying, if it sent one.
        retry_after: Option<Duration>,
    },

    /// Request timed out.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 or image data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., reading the source or saving the result).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Response did not contain what we expected (e.g., no image part).
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl BackdropError {
    /// Returns true if this error is likely transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_)
        )
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Timeout(_) => Some(Duration::from_secs(1)),
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for background editing operations.
pub type Result<T> = std::result::Result<T, BackdropError>;

/// Parses a `Retry-After` header value as whole seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Maximum length of an upstream message we echo back to callers.
const MAX_MESSAGE_LEN: usize = 600;

/// Redacts `key=` query values and caps the length of an upstream error body.
///
/// Gemini error bodies sometimes echo the request URL, which carries the API
/// key as a query parameter. These strings end up in user-facing errors.
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let mut out = String::with_capacity(text.len().min(MAX_MESSAGE_LEN));
    let mut rest = text;
    while let Some(pos) = rest.find("key=") {
        out.push_str(&rest[..pos + 4]);
        out.push_str("[redacted]");
        let after = &rest[pos + 4..];
        let end = after
            .find(|c: char| c == '&' || c == '"' || c.is_ascii_whitespace())
            .unwrap_or(after.len());
        rest = &after[end..];
    }
    out.push_str(rest);

    if out.len() > MAX_MESSAGE_LEN {
        let mut cut = MAX_MESSAGE_LEN;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        out.push_str("...");
    }
    out
}
