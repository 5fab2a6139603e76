use std::sync::Arc;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::sync::Semaphore;
use tracing::warn;

use crate::app::error::{FreshetError, Result};
use crate::reader::Article;
use crate::scraper::{ContentExtractor, ExtractedContent, FetchMode, Scraper, ScraperConfig};

/// Chrome-based content extractor using chromiumoxide.
#[derive(Clone)]
pub struct ChromeScraper {
    browser: Arc<Browser>,
    config: ScraperConfig,
    extractor: ContentExtractor,
    semaphore: Arc<Semaphore>,
}

impl ChromeScraper {
    /// Launch a browser with the given configuration.
    pub async fn launch(config: ScraperConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| FreshetError::Scrape(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            FreshetError::Scrape(format!(
                "failed to launch browser: {e}. Is Chrome or Chromium installed and in PATH?"
            ))
        })?;

        tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drain browser events.
            }
        });

        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        let extractor = ContentExtractor::new(config.clone());

        Ok(Self {
            browser: Arc::new(browser),
            config,
            extractor,
            semaphore,
        })
    }

    /// Close the browser. A no-op with a warning if pages are still in
    /// flight elsewhere.
    pub async fn close(self) -> Result<()> {
        match Arc::into_inner(self.browser) {
            Some(mut browser) => {
                browser
                    .close()
                    .await
                    .map_err(|e| FreshetError::Scrape(format!("failed to close browser: {e}")))?;
                let _ = browser.wait().await;
                Ok(())
            }
            None => {
                warn!("browser still in use, skipping close");
                Ok(())
            }
        }
    }

    async fn scrape_page(&self, url: &str, mode: FetchMode) -> Result<ExtractedContent> {
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| FreshetError::Scrape(format!("failed to open page: {e}")))?;

        if let Some(ref user_agent) = self.config.user_agent {
            page.set_user_agent(user_agent)
                .await
                .map_err(|e| FreshetError::Scrape(format!("failed to set user agent: {e}")))?;
        }

        page.wait_for_navigation()
            .await
            .map_err(|e| FreshetError::Scrape(format!("navigation failed: {e}")))?;

        if mode == FetchMode::Dynamic {
            tokio::time::sleep(self.config.wait_after_load()).await;
        }

        let value: serde_json::Value = page
            .evaluate(self.extractor.extraction_script())
            .await
            .map_err(|e| FreshetError::Scrape(format!("extraction script failed: {e}")))?
            .into_value()
            .map_err(|e| FreshetError::Scrape(format!("failed to parse extraction result: {e:?}")))?;

        let _ = page.close().await;

        let text = value["text"].as_str().unwrap_or("").trim().to_string();
        let html = value["html"].as_str().unwrap_or("").trim().to_string();
        let meta = |key: &str| {
            value[key]
                .as_str()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };

        let (content, is_html) = if !text.is_empty() {
            (text, false)
        } else if !html.is_empty() {
            (html, true)
        } else {
            return Err(FreshetError::Scrape(format!("no content extracted from {url}")));
        };

        Ok(ExtractedContent {
            url: url.to_string(),
            content,
            is_html,
            title: meta("title"),
            author: meta("author"),
            date: meta("date"),
            mode,
        })
    }

    async fn scrape_with_timeout(&self, url: &str, mode: FetchMode) -> Result<ExtractedContent> {
        tokio::time::timeout(self.config.timeout(), self.scrape_page(url, mode))
            .await
            .map_err(|_| FreshetError::Scrape(format!("timed out loading {url}")))?
    }
}

#[async_trait]
impl Scraper for ChromeScraper {
    async fn extract(&self, url: &str, mode: FetchMode) -> Result<ExtractedContent> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| FreshetError::Scrape(format!("semaphore error: {e}")))?;

        self.scrape_with_timeout(url, mode).await
    }

    async fn extract_for_articles(
        &self,
        articles: &[Article],
        mode: FetchMode,
        concurrency: usize,
    ) -> Vec<(String, Result<ExtractedContent>)> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut handles = Vec::new();

        for article in articles {
            let Some(url) = article.link() else {
                continue;
            };

            let url = url.to_string();
            let article_id = article.id.clone();
            let scraper = self.clone();
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire().await;
                let result = scraper.scrape_with_timeout(&url, mode).await;
                (article_id, result)
            }));
        }

        let mut results = Vec::new();
        for handle in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("extraction task join error: {e}");
                }
            }
        }

        results
    }
}
