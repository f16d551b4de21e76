//! HTTP backend abstraction for the Safefeed API.
//!
//! Clients are generic over a backend so that they can be driven by a mock
//! in tests. The production implementations use reqwest with automatic
//! retry for transient errors.

use std::time::Duration;

use url::Url;

#[cfg(feature = "blocking")]
use crate::config::SafefeedConfig;
use crate::error::SafefeedError;
#[cfg(feature = "blocking")]
use crate::error::SafefeedResult;
use crate::url::redact_key;

/// Delay before retry number `attempt` (1-based).
fn backoff_delay(base: Duration, attempt: u8) -> Duration {
    let factor = 2u32.saturating_pow(u32::from(attempt.saturating_sub(1)));
    base.saturating_mul(factor)
}

/// Turn a non-success status into an error.
fn status_error(status: reqwest::StatusCode, url: &Url) -> SafefeedError {
    SafefeedError::ApiRequestFailed {
        status: status.as_u16(),
        url: redact_key(url),
    }
}

fn build_client_error(e: reqwest::Error) -> SafefeedError {
    SafefeedError::InvalidResponse {
        message: format!("failed to create HTTP client: {e}"),
    }
}

fn exhausted() -> SafefeedError {
    SafefeedError::InvalidResponse {
        message: "Unknown error during fetch".to_string(),
    }
}

// ============================================================================
// Async Backend
// ============================================================================

#[cfg(feature = "aio")]
pub use self::aio::{FeedBackend, ReqwestBackend};

#[cfg(all(feature = "aio", test))]
pub use self::aio::MockFeedBackend;

#[cfg(feature = "aio")]
mod aio {
    use super::{backoff_delay, build_client_error, exhausted, status_error};
    use crate::config::SafefeedConfig;
    use crate::error::{SafefeedError, SafefeedResult};
    use async_trait::async_trait;
    use std::time::Duration;
    use url::Url;

    /// Trait for async backends that fetch a feed URL.
    #[cfg_attr(test, mockall::automock)]
    #[async_trait]
    pub trait FeedBackend: Send + Sync {
        /// Fetch the body of a successful response.
        async fn fetch(&self, url: &Url) -> SafefeedResult<String>;
    }

    /// Production async backend using reqwest with retry logic.
    ///
    /// Server errors (5xx), rate limiting (429) and network errors are
    /// retried with exponential backoff; other statuses fail immediately.
    #[derive(Debug, Clone)]
    pub struct ReqwestBackend {
        client: reqwest::Client,
        max_retries: u8,
        retry_base_delay: Duration,
    }

    impl ReqwestBackend {
        /// Create a new reqwest backend with the given configuration.
        pub fn new(config: &SafefeedConfig) -> SafefeedResult<Self> {
            let client = reqwest::Client::builder()
                .timeout(config.timeout)
                .user_agent(config.user_agent.as_str())
                .build()
                .map_err(build_client_error)?;

            Ok(Self {
                client,
                max_retries: config.max_retries,
                retry_base_delay: config.retry_base_delay,
            })
        }

        /// Fetch a URL with automatic retry for transient errors.
        async fn fetch_with_retry(&self, url: &Url) -> SafefeedResult<reqwest::Response> {
            let mut last_error: Option<SafefeedError> = None;

            for attempt in 0..=self.max_retries {
                if attempt > 0 {
                    let delay = backoff_delay(self.retry_base_delay, attempt);
                    tracing::debug!(attempt, ?delay, "Retrying Safefeed request");
                    tokio::time::sleep(delay).await;
                }

                let error = match self.client.get(url.as_str()).send().await {
                    Ok(response) => {
                        let status = response.status();
                        tracing::debug!(status = status.as_u16(), "Safefeed responded");
                        if status.is_success() {
                            return Ok(response);
                        }
                        status_error(status, url)
                    }
                    Err(e) => e.without_url().into(),
                };

                if !error.is_transient() || attempt == self.max_retries {
                    return Err(error);
                }
                tracing::warn!(attempt, error = %error, "Transient Safefeed error");
                last_error = Some(error);
            }

            Err(last_error.unwrap_or_else(exhausted))
        }
    }

    #[async_trait]
    impl FeedBackend for ReqwestBackend {
        async fn fetch(&self, url: &Url) -> SafefeedResult<String> {
            let response = self.fetch_with_retry(url).await?;
            Ok(response.text().await.map_err(reqwest::Error::without_url)?)
        }
    }
}

// ============================================================================
// Blocking Backend
// ============================================================================

/// Trait for blocking backends that fetch a feed URL.
#[cfg(feature = "blocking")]
#[cfg_attr(test, mockall::automock)]
pub trait BlockingFeedBackend: Send {
    /// Fetch the body of a successful response.
    fn fetch(&self, url: &Url) -> SafefeedResult<String>;
}

/// Production blocking backend using reqwest's blocking client.
///
/// Same retry policy as the async backend. Must not be used from within an
/// async runtime.
#[cfg(feature = "blocking")]
#[derive(Debug, Clone)]
pub struct BlockingReqwestBackend {
    client: reqwest::blocking::Client,
    max_retries: u8,
    retry_base_delay: Duration,
}

#[cfg(feature = "blocking")]
impl BlockingReqwestBackend {
    /// Create a new blocking backend with the given configuration.
    pub fn new(config: &SafefeedConfig) -> SafefeedResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(build_client_error)?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
        })
    }

    fn fetch_with_retry(&self, url: &Url) -> SafefeedResult<reqwest::blocking::Response> {
        let mut last_error: Option<SafefeedError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base_delay, attempt);
                tracing::debug!(attempt, ?delay, "Retrying Safefeed request");
                std::thread::sleep(delay);
            }

            let error = match self.client.get(url.as_str()).send() {
                Ok(response) => {
                    let status = response.status();
                    tracing::debug!(status = status.as_u16(), "Safefeed responded");
                    if status.is_success() {
                        return Ok(response);
                    }
                    status_error(status, url)
                }
                Err(e) => e.without_url().into(),
            };

            if !error.is_transient() || attempt == self.max_retries {
                return Err(error);
            }
            tracing::warn!(attempt, error = %error, "Transient Safefeed error");
            last_error = Some(error);
        }

        Err(last_error.unwrap_or_else(exhausted))
    }
}

#[cfg(feature = "blocking")]
impl BlockingFeedBackend for BlockingReqwestBackend {
    fn fetch(&self, url: &Url) -> SafefeedResult<String> {
        let response = self.fetch_with_retry(url)?;
        Ok(response.text().map_err(reqwest::Error::without_url)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SafefeedConfig;

    #[test]
    fn test_backoff_delay_doubles() {
        let base = Duration::from_millis(500);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(2000));
    }

    #[test]
    fn test_backoff_delay_saturates() {
        let delay = backoff_delay(Duration::from_secs(1), u8::MAX);
        assert!(delay >= Duration::from_secs(u64::from(u32::MAX)));
    }

    #[test]
    fn test_status_error_redacts_key() {
        let url = Url::parse("https://feed.opoint.com/safefeed.php?key=secret&lastid=1").unwrap();
        let error = status_error(reqwest::StatusCode::FORBIDDEN, &url);
        match error {
            SafefeedError::ApiRequestFailed { status, url } => {
                assert_eq!(status, 403);
                assert!(!url.contains("secret"));
            }
            other => panic!("Expected ApiRequestFailed, got {other:?}"),
        }
    }

    #[cfg(feature = "aio")]
    #[test]
    fn test_reqwest_backend_creation() {
        let config = SafefeedConfig::new("k").with_max_retries(5);
        assert!(ReqwestBackend::new(&config).is_ok());
    }

    #[cfg(feature = "blocking")]
    #[test]
    fn test_blocking_backend_creation() {
        let config = SafefeedConfig::new("k").with_timeout(Duration::from_secs(1));
        assert!(BlockingReqwestBackend::new(&config).is_ok());
    }
}
