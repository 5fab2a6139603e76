//! Configuration management.
//!
//! Configuration is read from `~/.config/freshet/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. Missing fields use default values. Credentials never live
//! here; they stay in the OS keychain.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::app::error::{FreshetError, Result};
use crate::scraper::ScraperConfig;

/// Main configuration struct.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout for API calls, in seconds.
    pub request_timeout_secs: u64,

    /// User agent sent with API requests.
    pub user_agent: String,

    /// Output directory for digest runs.
    pub digest_dir: String,

    pub scraper: ScraperConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            user_agent: "freshet/0.1.0".to_string(),
            digest_dir: "~/Documents/freshet-digest".to_string(),
            scraper: ScraperConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating a commented
    /// default file when none exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::default_config_path()?;

        if !path.exists() {
            Self::create_default_config(&path)?;
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| FreshetError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The digest output directory with a leading `~/` expanded.
    pub fn digest_path(&self) -> PathBuf {
        if let Some(rest) = self.digest_dir.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.digest_dir)
    }

    /// Default config file path: `~/.config/freshet/config.toml`
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FreshetError::Config("could not determine config directory".into()))?;
        Ok(config_dir.join("freshet").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::File::create(path)?;
        file.write_all(Self::default_config_content().as_bytes())?;
        Ok(())
    }

    fn default_config_content() -> String {
        r##"# freshet configuration
#
# Credentials are not stored here; run `freshet setup` to put them in the
# OS keychain.

# Per-request timeout for API calls, in seconds
request_timeout_secs = 30

# Output directory for `unread --digest`
digest_dir = "~/Documents/freshet-digest"

[scraper]
# Run the browser in headless mode (no visible window)
headless = true

# Page load timeout in seconds
timeout_secs = 30

# Extra wait for JS-rendered pages in dynamic mode (milliseconds)
wait_after_load_ms = 1500

# Maximum concurrent browser pages
max_concurrency = 4
"##
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_content_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("default config should be valid TOML");

        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.digest_dir, "~/Documents/freshet-digest");
        assert!(config.scraper.headless);
    }

    #[test]
    fn test_partial_config() {
        let content = r#"
request_timeout_secs = 5

[scraper]
timeout_secs = 10
"#;
        let config: Config = toml::from_str(content).expect("partial config should work");

        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.scraper.timeout_secs, 10);
        // Defaults for the rest
        assert_eq!(config.user_agent, "freshet/0.1.0");
        assert_eq!(config.scraper.wait_after_load_ms, 1500);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("empty config should work");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_create_default_then_load_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        Config::create_default_config(&path).unwrap();
        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.scraper.max_concurrency, 4);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "request_timeout_secs = \"soon\"").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, FreshetError::Config(_)));
    }

    #[test]
    fn test_digest_path_expands_home() {
        let config = Config::default();
        let path = config.digest_path();
        assert!(path.ends_with("Documents/freshet-digest"));
        if dirs::home_dir().is_some() {
            assert!(!path.starts_with("~"));
        }
    }
}
