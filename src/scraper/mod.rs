//! Full-article content extraction.
//!
//! Feed entries often carry only a summary. This module loads the original
//! page in headless Chrome, strips navigation and ads, and pulls out the
//! main article body plus whatever metadata the page exposes (title,
//! author, publication date).
//!
//! The browser is an explicitly owned resource: launched by
//! [`ChromeScraper::launch`], released by [`ChromeScraper::close`].

mod chrome;
mod config;
mod extractor;

pub use chrome::ChromeScraper;
pub use config::ScraperConfig;
pub use extractor::ContentExtractor;

use async_trait::async_trait;

use crate::app::error::Result;
use crate::reader::Article;

/// How a page is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Extract as soon as the page has loaded.
    Static,
    /// Wait after load so JS-heavy pages can render before extracting.
    Dynamic,
}

impl FetchMode {
    pub fn label(&self) -> &'static str {
        match self {
            FetchMode::Static => "static",
            FetchMode::Dynamic => "dynamic",
        }
    }
}

/// Extracted article content plus page metadata.
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    pub url: String,
    /// The extracted body, plain text when the page allows it.
    pub content: String,
    pub is_html: bool,
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub mode: FetchMode,
}

/// Trait for content extraction implementations.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Extract the main content of a single page.
    async fn extract(&self, url: &str, mode: FetchMode) -> Result<ExtractedContent>;

    /// Extract content for several articles concurrently. Articles without
    /// a link are skipped. Returns `(article_id, result)` pairs.
    async fn extract_for_articles(
        &self,
        articles: &[Article],
        mode: FetchMode,
        concurrency: usize,
    ) -> Vec<(String, Result<ExtractedContent>)>;
}
