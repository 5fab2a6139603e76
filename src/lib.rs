//! # Freshet
//!
//! A CLI client for the Google-Reader-compatible API exposed by FreshRSS.
//!
//! ## Architecture
//!
//! ```text
//! keychain → credentials → ReaderClient → JSON output
//!                               ↘ scraper (full-article extraction)
//! ```
//!
//! - [`reader`]: the protocol client — token lifecycle, listings,
//!   stream pagination, tag edits
//! - [`secrets`]: OS-keychain credential storage
//! - [`scraper`]: full-article content extraction via headless Chrome
//! - [`cli`]: command shell with JSON output
//!
//! ## Quick Start
//!
//! ```bash
//! # Store credentials in the OS keychain
//! freshet setup
//!
//! # List unread articles
//! freshet unread -n 10
//!
//! # Mark them as read
//! freshet read <id>...
//!
//! # List subscriptions with unread counts
//! freshet subs
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together configuration and the
/// credential store; [`FreshetError`](app::FreshetError) is the crate-wide
/// error type.
pub mod app;

/// Command-line interface using clap.
///
/// Subcommands: `setup`, `unread`, `article`, `fetch`, `read`, `star`,
/// `subs`. All output is JSON.
pub mod cli;

/// Configuration management.
///
/// Loads `~/.config/freshet/config.toml`: request timeout, digest output
/// directory, scraper settings.
pub mod config;

/// Client for the Google Reader API dialect spoken by FreshRSS.
///
/// - [`ReaderClient`](reader::ReaderClient): authentication, listings,
///   pagination, tag edits
/// - [`Transport`](reader::Transport): swappable HTTP seam
pub mod reader;

/// Credential storage in the OS keychain.
pub mod secrets;

/// Full-article content extraction via headless Chrome.
///
/// - [`ChromeScraper`](scraper::ChromeScraper): chromiumoxide-based scraper
/// - [`ScraperConfig`](scraper::ScraperConfig): selectors and timeouts
pub mod scraper;
