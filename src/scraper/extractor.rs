use crate::scraper::ScraperConfig;

/// Builds the JavaScript that runs in the page to pull out the article.
#[derive(Clone)]
pub struct ContentExtractor {
    config: ScraperConfig,
}

impl ContentExtractor {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Generate the in-page extraction script.
    ///
    /// The script removes unwanted elements, reads page metadata (title,
    /// author, publication date), then tries the configured content
    /// selectors in priority order, falling back to `<body>`.
    pub fn extraction_script(&self) -> String {
        let remove_selectors = Self::js_string_list(&self.config.remove_selectors);
        let content_selectors = Self::js_string_list(&self.config.content_selectors);

        format!(
            r#"
            (() => {{
                const removeSelectors = [{remove_selectors}];
                for (const selector of removeSelectors) {{
                    document.querySelectorAll(selector).forEach(el => el.remove());
                }}

                const attr = (selector, name) => {{
                    const el = document.querySelector(selector);
                    return el ? el.getAttribute(name) : null;
                }};
                const title = attr('meta[property="og:title"]', 'content')
                    || document.title
                    || null;
                const author = attr('meta[name="author"]', 'content');
                const date = attr('meta[property="article:published_time"]', 'content')
                    || attr('time[datetime]', 'datetime');

                const contentSelectors = [{content_selectors}];
                for (const selector of contentSelectors) {{
                    const element = document.querySelector(selector);
                    if (element && element.innerText.trim().length > 100) {{
                        return {{
                            html: element.innerHTML,
                            text: element.innerText,
                            title, author, date
                        }};
                    }}
                }}

                const body = document.body;
                if (body) {{
                    return {{
                        html: body.innerHTML,
                        text: body.innerText,
                        title, author, date
                    }};
                }}

                return {{ html: '', text: '', title, author, date }};
            }})()
            "#
        )
    }

    fn js_string_list(selectors: &[String]) -> String {
        selectors
            .iter()
            .map(|s| format!("'{}'", s.replace('\'', "\\'")))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_script_contains_selectors() {
        let extractor = ContentExtractor::new(ScraperConfig::default());
        let script = extractor.extraction_script();

        assert!(script.contains("removeSelectors"));
        assert!(script.contains("contentSelectors"));
        assert!(script.contains("'article'"));
    }

    #[test]
    fn test_extraction_script_reads_metadata() {
        let extractor = ContentExtractor::new(ScraperConfig::default());
        let script = extractor.extraction_script();

        assert!(script.contains("og:title"));
        assert!(script.contains("article:published_time"));
        assert!(script.contains("meta[name=\"author\"]"));
    }

    #[test]
    fn test_selectors_are_quoted_and_escaped() {
        let mut config = ScraperConfig::default();
        config.content_selectors = vec!["[data-test='x']".to_string()];
        let script = ContentExtractor::new(config).extraction_script();

        assert!(script.contains(r"'[data-test=\'x\']'"));
    }
}
