//! Client for the Google-Reader-compatible API exposed by FreshRSS.
//!
//! The client owns the HTTP transport and the token lifecycle:
//!
//! ```text
//! username/password → auth token → (per write) action token
//! ```
//!
//! The auth token is obtained lazily on the first endpoint call and cached
//! for the lifetime of the client. The action token is required by
//! state-mutating endpoints and is fetched fresh for every write, since the
//! remote treats it as single-use.

pub mod models;
pub mod transport;

pub use models::{Article, Category, StreamContents, Subscription, UnreadCount};
pub use transport::{HttpTransport, Transport};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use crate::app::error::{FreshetError, Result};
use models::{SubscriptionList, UnreadCountResponse};
use transport::{Response, TransportError};

/// Well-known state tags. Opaque protocol strings, attached to and removed
/// from articles via the edit-tag endpoint.
pub const STATE_READ: &str = "user/-/state/com.google/read";
pub const STATE_STARRED: &str = "user/-/state/com.google/starred";
pub const STATE_READING_LIST: &str = "user/-/state/com.google/reading-list";

/// Practical per-request cap on stream page size.
const MAX_PAGE_SIZE: usize = 100;

/// Escape everything outside the unreserved set, so a stream ID embeds into
/// a single path segment. Stream IDs contain `/` from tag-style identifiers
/// and must be escaped, not split.
const STREAM_ID_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Percent-encode a stream ID for use as a path segment.
pub fn encode_stream_id(stream_id: &str) -> String {
    utf8_percent_encode(stream_id, STREAM_ID_SEGMENT).to_string()
}

/// Client for a single FreshRSS account. One logical session per instance;
/// token refresh is serialized internally, so sharing an instance across
/// tasks cannot race duplicate logins.
pub struct ReaderClient {
    api_url: String,
    username: String,
    password: String,
    transport: Arc<dyn Transport>,
    auth_token: Mutex<Option<String>>,
}

impl ReaderClient {
    /// Create a client backed by a real HTTP transport. `api_url` is the
    /// base URL of the FreshRSS Reader API, e.g.
    /// `https://rss.example.com/api/greader.php`.
    pub fn new(
        api_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let transport = HttpTransport::new(timeout, user_agent)
            .map_err(|e| FreshetError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_transport(
            api_url,
            username,
            password,
            Arc::new(transport),
        ))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        api_url: &str,
        username: &str,
        password: &str,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            transport,
            auth_token: Mutex::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Url::parse(&format!("{}/{}", self.api_url, path))
            .map_err(|e| FreshetError::Config(format!("invalid API URL: {e}")))
    }

    fn api_error(context: &str, response: &Response) -> FreshetError {
        FreshetError::Api {
            message: format!("{context}: {}", response.status),
            status: Some(response.status),
        }
    }

    fn transport_error(context: &str, e: TransportError) -> FreshetError {
        FreshetError::Api {
            message: format!("{context}: {e}"),
            status: None,
        }
    }

    /// Return the auth token, exchanging username/password for a fresh one
    /// when none is cached yet. Guarded by a mutex, so concurrent callers
    /// cannot race duplicate logins; authenticating twice performs a single
    /// login request.
    ///
    /// The server may invalidate a token mid-session; that is not detected
    /// here and surfaces from the next endpoint call as an API error. No
    /// automatic retry-with-reauth is performed.
    pub async fn authenticate(&self) -> Result<String> {
        let mut cached = self.auth_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let token = self.login().await?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Raw credential exchange. The response body is a newline-delimited
    /// `key=value` block (not JSON); the token lives under the `Auth` key.
    async fn login(&self) -> Result<String> {
        let url = self.endpoint("accounts/ClientLogin")?;
        let form = vec![
            ("Email".to_string(), self.username.clone()),
            ("Passwd".to_string(), self.password.clone()),
        ];

        let response = self
            .transport
            .post_form(url, &form, None)
            .await
            .map_err(|e| FreshetError::Auth(format!("authentication request failed: {e}")))?;

        if !response.is_success() {
            return Err(FreshetError::Auth(format!(
                "authentication failed: {}",
                response.status
            )));
        }

        let mut fields: HashMap<&str, &str> = HashMap::new();
        for line in response.body.lines() {
            if let Some((key, value)) = line.split_once('=') {
                fields.insert(key, value);
            }
        }

        match fields.get("Auth") {
            Some(token) => {
                debug!(user = %self.username, "authenticated");
                Ok((*token).to_string())
            }
            None => Err(FreshetError::Auth(
                "Auth token not found in response".into(),
            )),
        }
    }

    /// Fetch the action token required by state-mutating endpoints.
    pub async fn action_token(&self) -> Result<String> {
        let token = self.authenticate().await?;
        let url = self.endpoint("reader/api/0/token")?;

        let response = self
            .transport
            .get(url, Some(&token))
            .await
            .map_err(|e| Self::transport_error("Failed to get token", e))?;

        if !response.is_success() {
            return Err(Self::api_error("Failed to get token", &response));
        }

        Ok(response.body.trim().to_string())
    }

    /// List feed subscriptions in server order.
    pub async fn subscriptions(&self) -> Result<Vec<Subscription>> {
        let token = self.authenticate().await?;
        let mut url = self.endpoint("reader/api/0/subscription/list")?;
        url.query_pairs_mut().append_pair("output", "json");

        let response = self
            .transport
            .get(url, Some(&token))
            .await
            .map_err(|e| Self::transport_error("Failed to get subscriptions", e))?;

        if !response.is_success() {
            return Err(Self::api_error("Failed to get subscriptions", &response));
        }

        let list: SubscriptionList = serde_json::from_str(&response.body)?;
        Ok(list.subscriptions)
    }

    /// Unread counts keyed by stream ID. Last write wins should the server
    /// ever repeat a key.
    pub async fn unread_counts(&self) -> Result<HashMap<String, i64>> {
        let token = self.authenticate().await?;
        let mut url = self.endpoint("reader/api/0/unread-count")?;
        url.query_pairs_mut().append_pair("output", "json");

        let response = self
            .transport
            .get(url, Some(&token))
            .await
            .map_err(|e| Self::transport_error("Failed to get unread counts", e))?;

        if !response.is_success() {
            return Err(Self::api_error("Failed to get unread counts", &response));
        }

        let parsed: UnreadCountResponse = serde_json::from_str(&response.body)?;
        Ok(parsed
            .unreadcounts
            .into_iter()
            .map(|c| (c.id, c.count))
            .collect())
    }

    /// Fetch one page of a stream (a feed, a category, or a state tag).
    pub async fn stream_contents(
        &self,
        stream_id: &str,
        count: usize,
        continuation: Option<&str>,
        exclude: Option<&str>,
    ) -> Result<StreamContents> {
        let token = self.authenticate().await?;
        let path = format!(
            "reader/api/0/stream/contents/{}",
            encode_stream_id(stream_id)
        );
        let mut url = self.endpoint(&path)?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("output", "json");
            query.append_pair("n", &count.to_string());
            if let Some(c) = continuation {
                query.append_pair("c", c);
            }
            if let Some(xt) = exclude {
                query.append_pair("xt", xt);
            }
        }

        let response = self
            .transport
            .get(url, Some(&token))
            .await
            .map_err(|e| Self::transport_error("Failed to get stream contents", e))?;

        if !response.is_success() {
            return Err(Self::api_error("Failed to get stream contents", &response));
        }

        Ok(serde_json::from_str(&response.body)?)
    }

    /// Collect up to `limit` unread articles, paginating through the
    /// reading list (or a single feed when `feed_id` is given) and always
    /// excluding read articles.
    ///
    /// A page without a continuation token, or one that returned fewer
    /// items than requested, signals end-of-stream. The short-page check
    /// also covers a misbehaving server that hands back a continuation
    /// token on an empty page.
    pub async fn unread_articles(
        &self,
        limit: usize,
        feed_id: Option<&str>,
    ) -> Result<Vec<Article>> {
        let stream_id = feed_id.unwrap_or(STATE_READING_LIST);
        let mut articles: Vec<Article> = Vec::new();
        let mut continuation: Option<String> = None;

        while articles.len() < limit {
            let batch_size = (limit - articles.len()).min(MAX_PAGE_SIZE);
            let page = self
                .stream_contents(
                    stream_id,
                    batch_size,
                    continuation.as_deref(),
                    Some(STATE_READ),
                )
                .await?;

            let received = page.items.len();
            articles.extend(page.items);

            if page.continuation.is_none() || received < batch_size {
                break;
            }
            continuation = page.continuation;
        }

        articles.truncate(limit);
        Ok(articles)
    }

    /// Look up a single article by ID. A missing article is an expected
    /// outcome for this endpoint, so HTTP errors fold into `None` instead
    /// of raising.
    pub async fn article_by_id(&self, article_id: &str) -> Result<Option<Article>> {
        let token = self.authenticate().await?;
        let url = self.endpoint("reader/api/0/stream/items/contents")?;
        let form = vec![
            ("i".to_string(), article_id.to_string()),
            ("output".to_string(), "json".to_string()),
        ];

        let response = self
            .transport
            .post_form(url, &form, Some(&token))
            .await
            .map_err(|e| Self::transport_error("Failed to get article", e))?;

        if !response.is_success() {
            return Ok(None);
        }

        let value: serde_json::Value = serde_json::from_str(&response.body)?;
        match value
            .get("items")
            .and_then(|items| items.as_array())
            .and_then(|items| items.first())
        {
            Some(item) => Ok(Some(serde_json::from_value(item.clone())?)),
            None => Ok(None),
        }
    }

    /// Add and/or remove a state tag on a batch of articles.
    ///
    /// Returns `Ok(true)` when the server acknowledges the whole batch with
    /// the literal body `OK`, `Ok(false)` on any other 2xx body. An empty
    /// ID list succeeds without any network call.
    pub async fn edit_tag(
        &self,
        article_ids: &[String],
        add_tag: Option<&str>,
        remove_tag: Option<&str>,
    ) -> Result<bool> {
        if article_ids.is_empty() {
            return Ok(true);
        }

        let token = self.authenticate().await?;
        let action_token = self.action_token().await?;
        let url = self.endpoint("reader/api/0/edit-tag")?;

        let mut form: Vec<(String, String)> = vec![("T".to_string(), action_token)];
        for id in article_ids {
            form.push(("i".to_string(), id.clone()));
        }
        if let Some(tag) = add_tag {
            form.push(("a".to_string(), tag.to_string()));
        }
        if let Some(tag) = remove_tag {
            form.push(("r".to_string(), tag.to_string()));
        }

        let response = self
            .transport
            .post_form(url, &form, Some(&token))
            .await
            .map_err(|e| Self::transport_error("Failed to edit tags", e))?;

        if !response.is_success() {
            return Err(Self::api_error("Failed to edit tags", &response));
        }

        Ok(response.body.trim() == "OK")
    }

    /// Mark articles as read.
    pub async fn mark_as_read(&self, article_ids: &[String]) -> Result<bool> {
        self.edit_tag(article_ids, Some(STATE_READ), None).await
    }

    /// Mark articles as starred.
    pub async fn mark_as_starred(&self, article_ids: &[String]) -> Result<bool> {
        self.edit_tag(article_ids, Some(STATE_STARRED), None).await
    }
}
