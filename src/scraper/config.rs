use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for full-article content extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Run the browser in headless mode (default: true)
    pub headless: bool,

    /// Page load timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Extra wait for JS-rendered content in dynamic mode, in milliseconds
    /// (default: 1500)
    pub wait_after_load_ms: u64,

    /// Maximum concurrent browser pages (default: 4)
    pub max_concurrency: usize,

    /// CSS selectors tried for the article body, in priority order
    pub content_selectors: Vec<String>,

    /// Elements removed before extraction (navigation, ads, ...)
    pub remove_selectors: Vec<String>,

    /// User agent presented to the page
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            wait_after_load_ms: 1500,
            max_concurrency: 4,
            content_selectors: vec![
                "article".to_string(),
                "[role=\"main\"]".to_string(),
                "main".to_string(),
                ".post-content".to_string(),
                ".article-content".to_string(),
                ".entry-content".to_string(),
                ".article-body".to_string(),
                "#content".to_string(),
                ".content".to_string(),
            ],
            remove_selectors: vec![
                "nav".to_string(),
                "header".to_string(),
                "footer".to_string(),
                "aside".to_string(),
                ".sidebar".to_string(),
                ".advertisement".to_string(),
                ".ad".to_string(),
                ".ads".to_string(),
                ".social-share".to_string(),
                ".comments".to_string(),
                ".related-posts".to_string(),
                "script".to_string(),
                "style".to_string(),
                "noscript".to_string(),
            ],
            user_agent: Some("Mozilla/5.0 (compatible; freshet/0.1)".to_string()),
        }
    }
}

impl ScraperConfig {
    /// Page load timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Post-load wait for dynamic content as a Duration.
    pub fn wait_after_load(&self) -> Duration {
        Duration::from_millis(self.wait_after_load_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = ScraperConfig::default();
        assert!(config.headless);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.wait_after_load_ms, 1500);
        assert_eq!(config.max_concurrency, 4);
        assert!(!config.content_selectors.is_empty());
        assert!(!config.remove_selectors.is_empty());
    }

    #[test]
    fn test_durations() {
        let config = ScraperConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.wait_after_load(), Duration::from_millis(1500));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ScraperConfig = toml::from_str("timeout_secs = 10").unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert!(config.headless);
        assert!(!config.content_selectors.is_empty());
    }
}
