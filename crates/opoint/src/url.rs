//! URL construction helpers for the Safefeed API.

use url::Url;

use crate::models::{DocFormat, LastId};

/// Query parameters of a single feed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedQuery<'a> {
    pub key: &'a str,
    pub doc_format: DocFormat,
    pub lastid: LastId,
    pub num_art: u32,
}

/// Build the request URL for one batch.
pub fn build_feed_url(base_url: &Url, query: &FeedQuery<'_>) -> Url {
    let mut url = base_url.clone();
    url.query_pairs_mut()
        .append_pair("key", query.key)
        .append_pair("doc_format", query.doc_format.as_api_param())
        .append_pair("lastid", &query.lastid.as_api_param())
        .append_pair("num_art", &query.num_art.to_string());
    url
}

/// Render a URL for logs and errors with the API key masked.
pub fn redact_key(url: &Url) -> String {
    if !url.query_pairs().any(|(name, _)| name == "key") {
        return url.to_string();
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| {
            let value = if name == "key" {
                "***".to_string()
            } else {
                value.into_owned()
            };
            (name.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://feed.opoint.com/safefeed.php").unwrap()
    }

    #[test]
    fn test_build_feed_url() {
        let query = FeedQuery {
            key: "sample-token",
            doc_format: DocFormat::Json,
            lastid: LastId::Id(1234),
            num_art: 500,
        };
        let url = build_feed_url(&base(), &query);

        assert_eq!(url.host_str(), Some("feed.opoint.com"));
        assert_eq!(url.path(), "/safefeed.php");
        assert_eq!(
            url.query(),
            Some("key=sample-token&doc_format=json&lastid=1234&num_art=500")
        );
    }

    #[test]
    fn test_newest_is_question_mark() {
        let query = FeedQuery {
            key: "k",
            doc_format: DocFormat::Xml,
            lastid: LastId::Newest,
            num_art: 50,
        };
        let url = build_feed_url(&base(), &query);
        let lastid = url
            .query_pairs()
            .find(|(name, _)| name == "lastid")
            .map(|(_, value)| value.into_owned());
        assert_eq!(lastid.as_deref(), Some("?"));
        assert!(url.query().unwrap().contains("doc_format=xml"));
    }

    #[test]
    fn test_key_is_encoded() {
        let query = FeedQuery {
            key: "a b&c",
            doc_format: DocFormat::Json,
            lastid: LastId::OLDEST,
            num_art: 1,
        };
        let url = build_feed_url(&base(), &query);
        assert!(url.query().unwrap().starts_with("key=a+b%26c&"));
    }

    #[test]
    fn test_existing_query_is_kept() {
        let base = Url::parse("http://localhost:9000/feed?region=eu").unwrap();
        let query = FeedQuery {
            key: "k",
            doc_format: DocFormat::Json,
            lastid: LastId::OLDEST,
            num_art: 10,
        };
        let url = build_feed_url(&base, &query);
        assert!(url.query().unwrap().starts_with("region=eu&key=k"));
    }

    #[test]
    fn test_redact_key() {
        let query = FeedQuery {
            key: "secret",
            doc_format: DocFormat::Json,
            lastid: LastId::Id(5),
            num_art: 10,
        };
        let redacted = redact_key(&build_feed_url(&base(), &query));
        assert!(!redacted.contains("secret"));
        assert!(redacted.contains("lastid=5"));

        let plain = Url::parse("https://example.com/x?a=1").unwrap();
        assert_eq!(redact_key(&plain), "https://example.com/x?a=1");
    }
}
