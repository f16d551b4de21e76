//! Client library for Opoint products.
//!
//! Currently this covers Safefeed, Opoint's polling article feed. Two
//! clients are available behind cargo features:
//!
//! - `blocking`: [`SyncSafefeedClient`], built on reqwest's blocking API.
//! - `aio`: [`SafefeedClient`], built on tokio.
//!
//! Both share the same cursor handling and adaptive pacing (see
//! [`FeedSession`]).
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

mod client;
mod config;
mod error;
mod http;
mod models;
mod pacing;
mod session;
mod url;

// ============================================================================
// Public API
// ============================================================================

// Clients
#[cfg(feature = "aio")]
pub use client::{DefaultSafefeedClient, SafefeedClient};
#[cfg(feature = "blocking")]
pub use client::{DefaultSyncSafefeedClient, SyncSafefeedClient};

// Backends
#[cfg(feature = "blocking")]
pub use http::{BlockingFeedBackend, BlockingReqwestBackend};
#[cfg(feature = "aio")]
pub use http::{FeedBackend, ReqwestBackend};

// Configuration
pub use config::{DEFAULT_BASE_URL, KEY_ENV, SafefeedConfig, URL_ENV};

// Errors
pub use error::{SafefeedError, SafefeedResult};

// Wire types
pub use models::{DocFormat, Document, FeedResponse, LastId, SearchResult};

// Polling state
pub use pacing::{DEFAULT_INTERVAL, DEFAULT_NUM_ART, DEFAULT_RATE, Pacer};
pub use session::FeedSession;

// Re-exported so custom backends can name the request type
pub use ::url::Url;

// Silence unused dev-dependency warnings
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
#[cfg(test)]
use wiremock as _;
#[cfg(all(test, not(feature = "aio")))]
use tokio as _;
