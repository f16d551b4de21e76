//! Asynchronous Safefeed client.

use futures_util::Stream;
use tokio::time::Instant;

use crate::config::SafefeedConfig;
use crate::error::SafefeedResult;
use crate::http::{FeedBackend, ReqwestBackend};
use crate::models::{DocFormat, FeedResponse, LastId};
use crate::session::FeedSession;

/// Asynchronous Safefeed client.
///
/// Each call to [`get_articles`](Self::get_articles) waits out the polling
/// interval (unless the client is behind), fetches one batch and moves the
/// cursor past it.
///
/// ```no_run
/// # async fn run() -> opoint::SafefeedResult<()> {
/// use opoint::{DefaultSafefeedClient, SafefeedConfig};
///
/// let mut client = DefaultSafefeedClient::new(&SafefeedConfig::new("sample-token"))?;
/// let batch = client.get_articles(None, None).await?;
/// println!("{} articles", batch.searchresult.documents);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SafefeedClient<B: FeedBackend> {
    backend: B,
    session: FeedSession,
}

impl SafefeedClient<ReqwestBackend> {
    /// Create a client using the reqwest backend.
    pub fn new(config: &SafefeedConfig) -> SafefeedResult<Self> {
        let backend = ReqwestBackend::new(config)?;
        Self::with_backend(config, backend)
    }
}

impl<B: FeedBackend> SafefeedClient<B> {
    /// Create a client with a custom backend.
    pub fn with_backend(config: &SafefeedConfig, backend: B) -> SafefeedResult<Self> {
        Ok(Self {
            backend,
            session: FeedSession::new(config)?,
        })
    }

    async fn wait_for_turn(&mut self) {
        if let Some(delay) = self.session.delay_before_next(Instant::now().into_std()) {
            tracing::info!(
                seconds = delay.as_secs_f64(),
                "Sleeping to respect interval setting"
            );
            tokio::time::sleep(delay).await;
            tracing::info!("Proceeding");
        }
        self.session.mark_request(Instant::now().into_std());
    }

    /// Get the next batch of articles.
    ///
    /// `lastid` and `size` override the cursor and batch size for this call.
    pub async fn get_articles(
        &mut self,
        lastid: Option<LastId>,
        size: Option<u32>,
    ) -> SafefeedResult<FeedResponse> {
        self.wait_for_turn().await;
        let url = self.session.request_url(lastid, size, DocFormat::Json);
        let body = self.backend.fetch(&url).await?;
        self.session.absorb_json(&body)
    }

    /// Get the next batch as raw XML.
    ///
    /// The body is not interpreted, so the cursor does not move; pass
    /// `lastid` explicitly to page through the feed.
    pub async fn get_articles_xml(
        &mut self,
        lastid: Option<LastId>,
        size: Option<u32>,
    ) -> SafefeedResult<String> {
        self.wait_for_turn().await;
        let url = self.session.request_url(lastid, size, DocFormat::Xml);
        self.backend.fetch(&url).await
    }

    /// Turn the client into an endless stream of batches.
    pub fn into_stream(self) -> impl Stream<Item = SafefeedResult<FeedResponse>> {
        futures_util::stream::unfold(self, |mut client| async move {
            let batch = client.get_articles(None, None).await;
            Some((batch, client))
        })
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
