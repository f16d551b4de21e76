//! Synchronous Safefeed client.

use std::time::Instant;

use crate::config::SafefeedConfig;
use crate::error::SafefeedResult;
use crate::http::{BlockingFeedBackend, BlockingReqwestBackend};
use crate::models::{DocFormat, FeedResponse, LastId};
use crate::session::FeedSession;

/// Synchronous Safefeed client.
///
/// By default the client adjusts its interval and batch size to get batches
/// of a fairly constant size at fairly constant intervals. Pinning any of
/// interval, batch size or expected rate in the configuration disables that.
///
/// The client is also an endless [`Iterator`] of batches:
///
/// ```no_run
/// use opoint::{DefaultSyncSafefeedClient, SafefeedConfig};
///
/// let client = DefaultSyncSafefeedClient::new(&SafefeedConfig::new("sample-token"))?;
/// for batch in client.take(3) {
///     println!("{} articles", batch?.searchresult.documents);
/// }
/// # Ok::<(), opoint::SafefeedError>(())
/// ```
#[derive(Debug)]
pub struct SyncSafefeedClient<B: BlockingFeedBackend> {
    backend: B,
    session: FeedSession,
}

impl SyncSafefeedClient<BlockingReqwestBackend> {
    /// Create a client using reqwest's blocking backend.
    pub fn new(config: &SafefeedConfig) -> SafefeedResult<Self> {
        let backend = BlockingReqwestBackend::new(config)?;
        Self::with_backend(config, backend)
    }
}

impl<B: BlockingFeedBackend> SyncSafefeedClient<B> {
    /// Create a client with a custom backend.
    pub fn with_backend(config: &SafefeedConfig, backend: B) -> SafefeedResult<Self> {
        Ok(Self {
            backend,
            session: FeedSession::new(config)?,
        })
    }

    fn wait_for_turn(&mut self) {
        if let Some(delay) = self.session.delay_before_next(Instant::now()) {
            tracing::info!(
                seconds = delay.as_secs_f64(),
                "Sleeping to respect interval setting"
            );
            std::thread::sleep(delay);
            tracing::info!("Proceeding");
        }
        self.session.mark_request(Instant::now());
    }

    /// Get the next batch of articles.
    ///
    /// `lastid` and `size` override the cursor and batch size for this call.
    pub fn get_articles(
        &mut self,
        lastid: Option<LastId>,
        size: Option<u32>,
    ) -> SafefeedResult<FeedResponse> {
        self.wait_for_turn();
        let url = self.session.request_url(lastid, size, DocFormat::Json);
        let body = self.backend.fetch(&url)?;
        self.session.absorb_json(&body)
    }

    /// Get the next batch as raw XML. The cursor does not move.
    pub fn get_articles_xml(
        &mut self,
        lastid: Option<LastId>,
        size: Option<u32>,
    ) -> SafefeedResult<String> {
        self.wait_for_turn();
        let url = self.session.request_url(lastid, size, DocFormat::Xml);
        self.backend.fetch(&url)
    }

    /// Current cursor.
    pub const fn lastid(&self) -> LastId {
        self.session.lastid()
    }

    /// Move the cursor.
    pub fn set_lastid(&mut self, lastid: LastId) {
        self.session.set_lastid(lastid);
    }

    /// Whether the client believes it is catching up on a backlog.
    pub fn is_behind(&self) -> bool {
        self.session.is_behind()
    }

    /// Polling state.
    pub const fn session(&self) -> &FeedSession {
        &self.session
    }
}

impl<B: BlockingFeedBackend> Iterator for SyncSafefeedClient<B> {
    type Item = SafefeedResult<FeedResponse>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.get_articles(None, None))
    }
}
