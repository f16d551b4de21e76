//! Wire types for the Safefeed API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::SafefeedError;

// ============================================================================
// Request Parameters
// ============================================================================

/// Response document format requested from the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    /// JSON documents (parsed into [`FeedResponse`])
    #[default]
    Json,
    /// XML documents (returned as raw text)
    Xml,
}

impl DocFormat {
    /// Value of the `doc_format` query parameter.
    pub const fn as_api_param(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_param())
    }
}

impl FromStr for DocFormat {
    type Err = SafefeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "xml" => Ok(Self::Xml),
            other => Err(SafefeedError::InvalidResponse {
                message: format!("unknown document format '{other}'"),
            }),
        }
    }
}

/// Position in the feed to continue from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LastId {
    /// Start at the current newest article.
    #[default]
    Newest,
    /// Continue after the given delivery id. `Id(0)` starts at the oldest
    /// article still retained by the feed.
    Id(u64),
}

impl LastId {
    /// The oldest article still retained by the feed.
    pub const OLDEST: Self = Self::Id(0);

    /// Value of the `lastid` query parameter.
    pub fn as_api_param(self) -> String {
        match self {
            Self::Newest => "?".to_string(),
            Self::Id(id) => id.to_string(),
        }
    }
}

impl fmt::Display for LastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Newest => f.write_str("?"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for LastId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "?" | "" => Ok(Self::Newest),
            other => other.parse().map(Self::Id),
        }
    }
}

impl From<u64> for LastId {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

// ============================================================================
// Response Body
// ============================================================================

/// Top-level JSON body returned by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedResponse {
    /// The batch and its bookkeeping
    pub searchresult: SearchResult,
    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One batch of articles plus feed bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Cursor to pass as `lastid` on the next request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_start: Option<u64>,
    /// Number of articles in this batch
    #[serde(default)]
    pub documents: u64,
    /// Server-side estimate of articles per second
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_rate: Option<f64>,
    /// The articles themselves
    #[serde(default)]
    pub document: Vec<Document>,
    /// Fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResult {
    /// Cursor for the following request.
    ///
    /// Prefers `search_start` and falls back to the delivery id of the last
    /// article in the batch.
    pub fn next_lastid(&self) -> Option<LastId> {
        self.search_start
            .or_else(|| self.document.last().and_then(|doc| doc.id_delivery))
            .map(LastId::Id)
    }
}

/// A single article.
///
/// Only the identifiers are typed; everything else (header, body, site
/// metadata, ...) is kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_site: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_article: Option<u64>,
    /// Position of this article in the feed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_delivery: Option<u64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Look up an untyped field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}
