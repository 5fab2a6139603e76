use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;

use serde_json::{json, Value};
use tracing::warn;

use crate::app::{AppContext, FreshetError, Result};
use crate::reader::Article;
use crate::scraper::{ChromeScraper, ExtractedContent, FetchMode, Scraper};
use crate::secrets::{self, Credentials};

const SUMMARY_MAX_CHARS: usize = 500;

/// Print a JSON value to stdout. All command output goes through here so
/// the tool stays scriptable.
pub fn output_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("failed to render output: {e}"),
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

pub async fn setup(ctx: &AppContext, clear: bool) -> Result<()> {
    if clear {
        secrets::clear_credentials(ctx.secrets.as_ref())?;
        output_json(&json!({"success": true, "message": "Credentials cleared"}));
        return Ok(());
    }

    println!("freshet setup");
    println!("Credentials are stored in your system keychain.");
    println!();

    let api_url = prompt("API URL (e.g. https://rss.example.com/api/greader.php): ")?;
    if api_url.is_empty() {
        return Err(FreshetError::InvalidInput("API URL is required".into()));
    }
    let username = prompt("Username: ")?;
    if username.is_empty() {
        return Err(FreshetError::InvalidInput("username is required".into()));
    }
    let password = prompt("API password (input is echoed): ")?;
    if password.is_empty() {
        return Err(FreshetError::InvalidInput("password is required".into()));
    }

    let credentials = Credentials {
        api_url,
        username,
        password,
    };

    println!();
    println!("Testing connection...");
    let client = ctx.client_for(&credentials)?;
    client.authenticate().await?;
    let subscription_count = client.subscriptions().await?.len();

    secrets::save_credentials(ctx.secrets.as_ref(), &credentials)?;
    output_json(&json!({
        "success": true,
        "message": "Credentials saved to keychain",
        "subscriptions": subscription_count,
    }));
    Ok(())
}

pub async fn unread(
    ctx: &AppContext,
    num: usize,
    feed: Option<String>,
    digest: bool,
    output: Option<String>,
    dynamic: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let client = ctx.reader_client()?;
    let articles = client.unread_articles(num, feed.as_deref()).await?;

    if digest {
        return unread_digest(ctx, articles, output, dynamic, timeout).await;
    }

    let listed: Vec<Value> = articles
        .iter()
        .map(|article| {
            let mut entry = article_fields(article);
            entry.insert(
                "summary".into(),
                json!(article
                    .summary
                    .as_ref()
                    .map(|s| truncate_summary(&s.content, SUMMARY_MAX_CHARS))
                    .unwrap_or_default()),
            );
            Value::Object(entry)
        })
        .collect();

    output_json(&json!({"count": listed.len(), "articles": listed}));
    Ok(())
}

async fn unread_digest(
    ctx: &AppContext,
    articles: Vec<Article>,
    output: Option<String>,
    dynamic: bool,
    timeout: Option<u64>,
) -> Result<()> {
    let output_dir = output
        .map(PathBuf::from)
        .unwrap_or_else(|| ctx.config.digest_path());

    if articles.is_empty() {
        output_json(&json!({
            "count": 0,
            "digest_mode": true,
            "message": "No unread articles found",
            "articles": [],
        }));
        return Ok(());
    }

    let mut scraper_config = ctx.config.scraper.clone();
    if let Some(secs) = timeout {
        scraper_config.timeout_secs = secs;
    }
    let mode = if dynamic {
        FetchMode::Dynamic
    } else {
        FetchMode::Static
    };
    let concurrency = scraper_config.max_concurrency;

    let scraper = ChromeScraper::launch(scraper_config).await?;
    let results = scraper
        .extract_for_articles(&articles, mode, concurrency)
        .await;
    if let Err(e) = scraper.close().await {
        warn!(error = %e, "failed to close browser");
    }

    let mut extracted: HashMap<String, Result<ExtractedContent>> = results.into_iter().collect();

    let mut success = 0usize;
    let mut failed = 0usize;
    let mut dynamic_used = 0usize;

    let listed: Vec<Value> = articles
        .iter()
        .map(|article| {
            let mut entry = article_fields(article);
            let rss_content = article
                .summary
                .as_ref()
                .map(|s| s.content.clone())
                .unwrap_or_default();

            match extracted.remove(&article.id) {
                Some(Ok(content)) => {
                    success += 1;
                    if content.mode == FetchMode::Dynamic {
                        dynamic_used += 1;
                    }
                    entry.insert("full_content".into(), json!(content.content));
                    entry.insert("content_source".into(), json!("fetched"));
                    entry.insert("fetch_method".into(), json!(content.mode.label()));
                    entry.insert("author".into(), json!(content.author));
                    entry.insert("fetch_date".into(), json!(content.date));
                }
                Some(Err(e)) => {
                    failed += 1;
                    entry.insert("full_content".into(), json!(rss_content));
                    entry.insert("content_source".into(), json!("rss"));
                    entry.insert("fetch_error".into(), json!(e.to_string()));
                }
                // The scraper skips articles without a link.
                None => {
                    failed += 1;
                    entry.insert("full_content".into(), json!(rss_content));
                    entry.insert("content_source".into(), json!("rss"));
                    entry.insert("fetch_error".into(), json!("No article link available"));
                }
            }

            let length = entry
                .get("full_content")
                .and_then(Value::as_str)
                .map(|c| c.chars().count())
                .unwrap_or(0);
            entry.insert("content_length".into(), json!(length));

            Value::Object(entry)
        })
        .collect();

    let today = chrono::Local::now().format("%Y-%m-%d");
    output_json(&json!({
        "count": listed.len(),
        "digest_mode": true,
        "output_dir": output_dir.display().to_string(),
        "fetch_stats": {
            "total": listed.len(),
            "success": success,
            "failed": failed,
            "dynamic_used": dynamic_used,
        },
        "suggested_filename": format!("digest-{today}.html"),
        "articles": listed,
    }));
    Ok(())
}

pub async fn article(ctx: &AppContext, id: &str) -> Result<()> {
    let client = ctx.reader_client()?;
    let article = client
        .article_by_id(id)
        .await?
        .ok_or_else(|| FreshetError::NotFound(format!("article {id}")))?;

    let mut entry = article_fields(&article);
    entry.insert(
        "content".into(),
        json!(article
            .summary
            .as_ref()
            .map(|s| s.content.as_str())
            .unwrap_or("")),
    );
    output_json(&Value::Object(entry));
    Ok(())
}

pub async fn fetch(
    ctx: &AppContext,
    url: &str,
    dynamic: bool,
    timeout: Option<u64>,
) -> Result<()> {
    if url.is_empty() {
        return Err(FreshetError::InvalidInput("URL is required".into()));
    }

    let mut scraper_config = ctx.config.scraper.clone();
    if let Some(secs) = timeout {
        scraper_config.timeout_secs = secs;
    }
    let mode = if dynamic {
        FetchMode::Dynamic
    } else {
        FetchMode::Static
    };

    let scraper = ChromeScraper::launch(scraper_config).await?;
    let result = scraper.extract(url, mode).await;
    if let Err(e) = scraper.close().await {
        warn!(error = %e, "failed to close browser");
    }

    let content = result?;
    output_json(&json!({
        "url": content.url,
        "method": content.mode.label(),
        "content": content.content,
        "is_html": content.is_html,
        "title": content.title,
        "author": content.author,
        "date": content.date,
    }));
    Ok(())
}

pub async fn mark_read(ctx: &AppContext, ids: Vec<String>) -> Result<()> {
    let client = ctx.reader_client()?;
    if !client.mark_as_read(&ids).await? {
        return Err(FreshetError::Api {
            message: "Failed to mark articles as read".into(),
            status: None,
        });
    }

    output_json(&json!({
        "success": true,
        "message": format!("Marked {} article(s) as read", ids.len()),
        "ids": ids,
    }));
    Ok(())
}

pub async fn mark_starred(ctx: &AppContext, ids: Vec<String>) -> Result<()> {
    let client = ctx.reader_client()?;
    if !client.mark_as_starred(&ids).await? {
        return Err(FreshetError::Api {
            message: "Failed to star articles".into(),
            status: None,
        });
    }

    output_json(&json!({
        "success": true,
        "message": format!("Starred {} article(s)", ids.len()),
        "ids": ids,
    }));
    Ok(())
}

pub async fn subs(ctx: &AppContext) -> Result<()> {
    let client = ctx.reader_client()?;
    let subscriptions = client.subscriptions().await?;
    let counts = client.unread_counts().await?;

    let mut listed: Vec<Value> = subscriptions
        .iter()
        .map(|sub| {
            json!({
                "id": sub.id,
                "title": sub.title,
                "url": sub.url,
                "unread": counts.get(&sub.id).copied().unwrap_or(0),
                "category": sub.categories.first().map(|c| c.label.clone()),
            })
        })
        .collect();

    listed.sort_by_key(|entry| std::cmp::Reverse(entry["unread"].as_i64().unwrap_or(0)));
    let total_unread: i64 = listed
        .iter()
        .map(|entry| entry["unread"].as_i64().unwrap_or(0))
        .sum();

    output_json(&json!({
        "count": listed.len(),
        "total_unread": total_unread,
        "subscriptions": listed,
    }));
    Ok(())
}

/// Common JSON fields for one article.
fn article_fields(article: &Article) -> serde_json::Map<String, Value> {
    let mut entry = serde_json::Map::new();
    entry.insert("id".into(), json!(article.id));
    entry.insert("title".into(), json!(article.title));
    entry.insert("link".into(), json!(article.link()));
    entry.insert("published".into(), json!(article.published_at().to_rfc3339()));
    entry.insert(
        "feed".into(),
        json!(article
            .origin
            .as_ref()
            .map(|o| o.title.as_str())
            .unwrap_or("")),
    );
    entry.insert(
        "feed_id".into(),
        json!(article
            .origin
            .as_ref()
            .map(|o| o.stream_id.as_str())
            .unwrap_or("")),
    );
    entry
}

/// Decode HTML entities and cap the summary at `max` characters.
fn truncate_summary(content: &str, max: usize) -> String {
    let decoded = html_escape::decode_html_entities(content);
    if decoded.chars().count() <= max {
        return decoded.into_owned();
    }
    let mut truncated: String = decoded.chars().take(max).collect();
    truncated.push_str("...");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::models::{ArticleLink, ArticleOrigin, ArticleSummary};

    fn article() -> Article {
        Article {
            id: "tag:google.com,2005:reader/item/0001".into(),
            title: "Hello".into(),
            published: 1_700_000_000,
            updated: None,
            canonical: vec![ArticleLink {
                href: Some("https://example.com/hello".into()),
            }],
            alternate: vec![],
            summary: Some(ArticleSummary {
                content: "A &amp; B".into(),
            }),
            origin: Some(ArticleOrigin {
                stream_id: "feed/1".into(),
                title: "Example".into(),
                html_url: "https://example.com/".into(),
            }),
        }
    }

    #[test]
    fn test_truncate_summary_short_passthrough() {
        assert_eq!(truncate_summary("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_summary_decodes_entities() {
        assert_eq!(truncate_summary("A &amp; B", 10), "A & B");
    }

    #[test]
    fn test_truncate_summary_appends_ellipsis() {
        assert_eq!(truncate_summary("abcdef", 3), "abc...");
    }

    #[test]
    fn test_truncate_summary_respects_char_boundaries() {
        // Multibyte characters must not be split.
        let summary = "日本語のテキスト";
        assert_eq!(truncate_summary(summary, 3), "日本語...");
    }

    #[test]
    fn test_article_fields() {
        let entry = article_fields(&article());
        assert_eq!(entry["id"], "tag:google.com,2005:reader/item/0001");
        assert_eq!(entry["link"], "https://example.com/hello");
        assert_eq!(entry["feed"], "Example");
        assert_eq!(entry["feed_id"], "feed/1");
        assert_eq!(entry["published"], "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_article_fields_without_origin() {
        let mut article = article();
        article.origin = None;
        let entry = article_fields(&article);
        assert_eq!(entry["feed"], "");
        assert_eq!(entry["feed_id"], "");
    }
}
