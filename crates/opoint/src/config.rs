//! Public configuration for the Safefeed clients.

use std::time::Duration;

use crate::error::{SafefeedError, SafefeedResult};
use crate::models::LastId;

/// Default Safefeed endpoint.
pub const DEFAULT_BASE_URL: &str = "https://feed.opoint.com/safefeed.php";

/// Environment variable holding the API key.
pub const KEY_ENV: &str = "OPOINT_SAFEFEED_KEY";

/// Environment variable overriding the endpoint.
pub const URL_ENV: &str = "OPOINT_SAFEFEED_URL";

/// Configuration for the Safefeed clients.
///
/// Leave `interval`, `num_art` and `expected_rate` unset unless you have a
/// reason to change them: the client then tunes its polling interval and
/// batch size from the observed article rate. Setting any of the three pins
/// all of them.
///
/// # Example
///
/// ```
/// use opoint::{LastId, SafefeedConfig};
/// use std::time::Duration;
///
/// let config = SafefeedConfig::new("my-api-key")
///     .with_timeout(Duration::from_secs(10))
///     .with_lastid(LastId::OLDEST);
/// ```
#[derive(Debug, Clone)]
pub struct SafefeedConfig {
    /// API key sent as the `key` parameter
    pub(crate) key: String,
    /// Feed endpoint
    pub(crate) base_url: String,
    /// Per-request timeout
    pub(crate) timeout: Duration,
    /// Minimum time between the start of two requests
    pub(crate) interval: Option<Duration>,
    /// Articles requested per batch
    pub(crate) num_art: Option<u32>,
    /// Expected articles per second
    pub(crate) expected_rate: Option<f64>,
    /// Where to start reading
    pub(crate) lastid: LastId,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
}

impl SafefeedConfig {
    /// Create a configuration with default settings for the given API key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            interval: None,
            num_art: None,
            expected_rate: None,
            lastid: LastId::Newest,
            user_agent: concat!("opoint/", env!("CARGO_PKG_VERSION")).to_string(),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    /// Build a configuration from `OPOINT_SAFEFEED_KEY` and the optional
    /// `OPOINT_SAFEFEED_URL`.
    pub fn from_env() -> SafefeedResult<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Build a configuration from variables resolved by `lookup`.
    ///
    /// Blank values count as unset.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> SafefeedResult<Self> {
        let present = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let key = present(KEY_ENV).ok_or_else(|| SafefeedError::MissingConfig {
            name: KEY_ENV.to_string(),
        })?;

        let config = Self::new(key.trim());
        Ok(match present(URL_ENV) {
            Some(url) => config.with_base_url(url.trim()),
            None => config,
        })
    }

    /// Set the feed endpoint.
    ///
    /// Defaults to `https://feed.opoint.com/safefeed.php`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Pin the polling interval. Ignored while the client is behind.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Pin the batch size. Only change this if processing is limited.
    ///
    /// A batch size of 0 is treated as 1.
    #[must_use]
    pub const fn with_num_art(mut self, num_art: u32) -> Self {
        self.num_art = Some(num_art);
        self
    }

    /// Pin the expected article rate (articles per second).
    #[must_use]
    pub const fn with_expected_rate(mut self, rate: f64) -> Self {
        self.expected_rate = Some(rate);
        self
    }

    /// Set the starting position.
    ///
    /// Defaults to [`LastId::Newest`].
    #[must_use]
    pub const fn with_lastid(mut self, lastid: LastId) -> Self {
        self.lastid = lastid;
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Whether pacing parameters are tuned from observed traffic.
    pub const fn autoconfig(&self) -> bool {
        self.interval.is_none() && self.num_art.is_none() && self.expected_rate.is_none()
    }

    /// The configured starting position.
    pub const fn lastid(&self) -> LastId {
        self.lastid
    }
}
