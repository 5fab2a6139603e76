use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feed category/folder as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
}

/// A feed subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "htmlUrl")]
    pub html_url: String,
    #[serde(rename = "iconUrl", default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionList {
    pub subscriptions: Vec<Subscription>,
}

/// An href-bearing link record. The server sometimes emits link objects
/// without an `href`, so the field stays optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleLink {
    #[serde(default)]
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub content: String,
}

/// Source feed info attached to an article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleOrigin {
    #[serde(rename = "streamId")]
    pub stream_id: String,
    pub title: String,
    #[serde(rename = "htmlUrl")]
    pub html_url: String,
}

/// A single article/item from a stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    /// Publication time as a Unix timestamp in seconds.
    pub published: i64,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub canonical: Vec<ArticleLink>,
    #[serde(default)]
    pub alternate: Vec<ArticleLink>,
    #[serde(default)]
    pub summary: Option<ArticleSummary>,
    #[serde(default)]
    pub origin: Option<ArticleOrigin>,
}

impl Article {
    /// The article URL: first canonical href, else first alternate href.
    ///
    /// When `canonical` is non-empty its first entry decides the outcome,
    /// even if that entry carries no href.
    pub fn link(&self) -> Option<&str> {
        if let Some(first) = self.canonical.first() {
            return first.href.as_deref();
        }
        self.alternate.first().and_then(|l| l.href.as_deref())
    }

    /// Publication timestamp as UTC.
    pub fn published_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.published, 0).unwrap_or_default()
    }
}

/// One page of a stream query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamContents {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub items: Vec<Article>,
    /// Present iff more items exist beyond this page.
    #[serde(default)]
    pub continuation: Option<String>,
}

/// Unread count for a single stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCount {
    pub id: String,
    pub count: i64,
    #[serde(rename = "newestItemTimestampUsec")]
    pub newest_item_timestamp_usec: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UnreadCountResponse {
    pub unreadcounts: Vec<UnreadCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_with_links(canonical: Vec<Option<&str>>, alternate: Vec<Option<&str>>) -> Article {
        let to_links = |hrefs: Vec<Option<&str>>| {
            hrefs
                .into_iter()
                .map(|h| ArticleLink {
                    href: h.map(String::from),
                })
                .collect()
        };
        Article {
            id: "tag:google.com,2005:reader/item/0001".into(),
            title: "Test".into(),
            published: 1_700_000_000,
            updated: None,
            canonical: to_links(canonical),
            alternate: to_links(alternate),
            summary: None,
            origin: None,
        }
    }

    #[test]
    fn test_link_prefers_canonical() {
        let article = article_with_links(
            vec![Some("https://example.com/canonical")],
            vec![Some("https://example.com/alternate")],
        );
        assert_eq!(article.link(), Some("https://example.com/canonical"));
    }

    #[test]
    fn test_link_falls_back_to_alternate() {
        let article = article_with_links(vec![], vec![Some("https://example.com/alternate")]);
        assert_eq!(article.link(), Some("https://example.com/alternate"));
    }

    #[test]
    fn test_link_absent() {
        let article = article_with_links(vec![], vec![]);
        assert_eq!(article.link(), None);
    }

    #[test]
    fn test_link_ignores_alternate_when_canonical_nonempty() {
        // First canonical entry without an href must not fall through.
        let article = article_with_links(vec![None], vec![Some("https://example.com/alternate")]);
        assert_eq!(article.link(), None);
    }

    #[test]
    fn test_published_at_is_utc() {
        let article = article_with_links(vec![], vec![]);
        assert_eq!(article.published_at().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_parse_stream_contents() {
        let json = r#"{
            "id": "user/-/state/com.google/reading-list",
            "title": "Reading List",
            "updated": 1700000100,
            "items": [
                {
                    "id": "tag:google.com,2005:reader/item/0002",
                    "title": "Hello &amp; World",
                    "published": 1700000000,
                    "canonical": [{"href": "https://example.com/post"}],
                    "summary": {"content": "<p>body</p>"},
                    "origin": {
                        "streamId": "feed/1",
                        "title": "Example Blog",
                        "htmlUrl": "https://example.com/"
                    }
                }
            ],
            "continuation": "page2"
        }"#;

        let page: StreamContents = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.continuation.as_deref(), Some("page2"));
        let article = &page.items[0];
        assert_eq!(article.link(), Some("https://example.com/post"));
        assert_eq!(article.origin.as_ref().unwrap().stream_id, "feed/1");
        assert_eq!(article.summary.as_ref().unwrap().content, "<p>body</p>");
    }

    #[test]
    fn test_parse_stream_contents_null_continuation() {
        let json = r#"{"id": "feed/1", "items": [], "continuation": null}"#;
        let page: StreamContents = serde_json::from_str(json).unwrap();
        assert!(page.items.is_empty());
        assert!(page.continuation.is_none());
    }

    #[test]
    fn test_parse_subscription() {
        let json = r#"{
            "id": "feed/1",
            "title": "Example Blog",
            "url": "https://example.com/feed.xml",
            "htmlUrl": "https://example.com/",
            "iconUrl": "https://example.com/favicon.ico",
            "categories": [{"id": "user/-/label/Tech", "label": "Tech"}]
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert_eq!(sub.html_url, "https://example.com/");
        assert_eq!(sub.icon_url.as_deref(), Some("https://example.com/favicon.ico"));
        assert_eq!(sub.categories[0].label, "Tech");
    }

    #[test]
    fn test_parse_subscription_without_optional_fields() {
        let json = r#"{
            "id": "feed/2",
            "title": "Plain",
            "url": "https://plain.example/feed",
            "htmlUrl": "https://plain.example/"
        }"#;
        let sub: Subscription = serde_json::from_str(json).unwrap();
        assert!(sub.icon_url.is_none());
        assert!(sub.categories.is_empty());
    }
}
