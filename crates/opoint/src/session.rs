//! Polling state shared by the sync and async clients.
//!
//! A [`FeedSession`] knows nothing about I/O: the clients ask it for the
//! next URL and how long to wait, perform the request, and hand the body
//! back. Keeping this separate lets both clients behave identically.

use std::time::{Duration, Instant};

use url::Url;

use crate::config::SafefeedConfig;
use crate::error::SafefeedResult;
use crate::models::{DocFormat, FeedResponse, LastId};
use crate::pacing::Pacer;
use crate::url::{FeedQuery, build_feed_url};

/// Cursor and pacing state of one feed consumer.
#[derive(Debug, Clone)]
pub struct FeedSession {
    key: String,
    base_url: Url,
    lastid: LastId,
    pacer: Pacer,
}

impl FeedSession {
    /// Create a session from a configuration.
    pub fn new(config: &SafefeedConfig) -> SafefeedResult<Self> {
        Ok(Self {
            key: config.key.clone(),
            base_url: Url::parse(&config.base_url)?,
            lastid: config.lastid,
            pacer: Pacer::new(config),
        })
    }

    /// URL for the next batch.
    ///
    /// `lastid` and `size` override the session cursor and the planned batch
    /// size for this request only.
    pub fn request_url(
        &self,
        lastid: Option<LastId>,
        size: Option<u32>,
        doc_format: DocFormat,
    ) -> Url {
        let query = FeedQuery {
            key: &self.key,
            doc_format,
            lastid: lastid.unwrap_or(self.lastid),
            num_art: size.unwrap_or_else(|| self.pacer.batch_size()),
        };
        build_feed_url(&self.base_url, &query)
    }

    /// Time to wait before the next request, if any.
    pub fn delay_before_next(&self, now: Instant) -> Option<Duration> {
        self.pacer.delay_before_next(now)
    }

    /// Record that a request starts at `now`.
    pub fn mark_request(&mut self, now: Instant) {
        self.pacer.mark_request(now);
    }

    /// Parse a JSON body and advance the cursor.
    ///
    /// On a parse error the cursor is left untouched so the same batch is
    /// requested again.
    pub fn absorb_json(&mut self, body: &str) -> SafefeedResult<FeedResponse> {
        let response: FeedResponse = match serde_json::from_str(body) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Could not decode JSON response body");
                tracing::debug!(body, "Full response body");
                return Err(e.into());
            }
        };

        let result = &response.searchresult;
        match result.next_lastid() {
            Some(next) => self.lastid = next,
            None => tracing::warn!(
                lastid = %self.lastid,
                "Response carries no cursor, keeping the current position"
            ),
        }
        self.pacer.observe(result.documents, result.expected_rate);

        Ok(response)
    }

    /// Current cursor.
    pub const fn lastid(&self) -> LastId {
        self.lastid
    }

    /// Move the cursor.
    pub fn set_lastid(&mut self, lastid: LastId) {
        self.lastid = lastid;
    }

    /// Whether the last batch was (nearly) full.
    pub fn is_behind(&self) -> bool {
        self.pacer.is_behind()
    }

    /// Current polling interval.
    pub fn interval(&self) -> Duration {
        self.pacer.interval()
    }

    /// Articles requested per batch.
    pub fn batch_size(&self) -> u32 {
        self.pacer.batch_size()
    }

    /// Current article rate estimate.
    pub const fn expected_rate(&self) -> Option<f64> {
        self.pacer.expected_rate()
    }
}
