//! Error types for Safefeed operations.

use thiserror::Error;

/// Result type alias for Safefeed operations.
pub type SafefeedResult<T> = Result<T, SafefeedError>;

/// Errors related to Safefeed API operations.
#[derive(Debug, Error)]
pub enum SafefeedError {
    /// API request failed with an HTTP error status.
    #[error("Safefeed request failed with status {status}: {url}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested, with the API key redacted
        url: String,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from Safefeed: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// A required configuration value was not provided.
    #[error("Missing configuration value '{name}'")]
    MissingConfig {
        /// Name of the missing setting (environment variable or field)
        name: String,
    },

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl SafefeedError {
    /// Whether retrying the same request later may succeed.
    ///
    /// Server errors (5xx), rate limiting and transport failures are
    /// transient; client errors and malformed responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ApiRequestFailed { status, .. } => *status >= 500 || *status == 429,
            Self::Network(_) => true,
            Self::InvalidResponse { .. }
            | Self::MissingConfig { .. }
            | Self::InvalidUrl(_)
            | Self::JsonParse(_) => false,
        }
    }
}
