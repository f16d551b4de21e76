//! CLI-specific error types and mappings.
//!
//! Maps feed errors to exit codes and user-facing messages.

use opoint::SafefeedError;
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument validation error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The feed refused the request (bad key, bad parameters).
    #[error("Feed rejected the request: {0}")]
    Rejected(String),

    /// Any other feed failure.
    #[error("Feed error: {0}")]
    Feed(String),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow sysexits.h where one fits.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2, // EX_USAGE
            Self::Config(_) => 78,   // EX_CONFIG
            Self::Rejected(_) => 77, // EX_NOPERM
            Self::Feed(_) => 69,     // EX_UNAVAILABLE
            Self::Io(_) => 74,       // EX_IOERR
        }
    }
}

impl From<SafefeedError> for CliError {
    fn from(err: SafefeedError) -> Self {
        match err {
            SafefeedError::ApiRequestFailed { status, .. } if (400..500).contains(&status) => {
                Self::Rejected(err.to_string())
            }
            SafefeedError::MissingConfig { .. } | SafefeedError::InvalidUrl(_) => {
                Self::Config(err.to_string())
            }
            other => Self::Feed(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_are_rejections() {
        let err: CliError = SafefeedError::ApiRequestFailed {
            status: 401,
            url: "https://feed.opoint.com/safefeed.php?key=***".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Rejected(_)));
        assert_eq!(err.exit_code(), 77);
    }

    #[test]
    fn test_server_errors_are_feed_errors() {
        let err: CliError = SafefeedError::ApiRequestFailed {
            status: 503,
            url: String::new(),
        }
        .into();
        assert!(matches!(err, CliError::Feed(_)));
        assert_eq!(err.exit_code(), 69);
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let err: CliError = SafefeedError::MissingConfig {
            name: "OPOINT_SAFEFEED_KEY".to_string(),
        }
        .into();
        assert_eq!(err.exit_code(), 78);
        assert!(err.to_string().contains("OPOINT_SAFEFEED_KEY"));
    }
}
