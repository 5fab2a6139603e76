pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "freshet")]
#[command(about = "A CLI client for the FreshRSS Google Reader API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure API credentials in the OS keychain
    Setup {
        /// Clear stored credentials
        #[arg(long)]
        clear: bool,
    },
    /// List unread articles
    Unread {
        /// Number of articles
        #[arg(short = 'n', long = "num", default_value_t = 20)]
        num: usize,

        /// Filter by feed ID
        #[arg(short, long)]
        feed: Option<String>,

        /// Fetch full content for each article
        #[arg(long)]
        digest: bool,

        /// Output directory for the digest (defaults to the configured one)
        #[arg(short, long)]
        output: Option<String>,

        /// Use browser rendering wait for JS-heavy pages
        #[arg(short, long)]
        dynamic: bool,

        /// Timeout per article fetch in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Show a single article by ID
    Article {
        /// Article ID
        id: String,
    },
    /// Fetch full content from a URL
    Fetch {
        /// Article URL
        url: String,

        /// Use browser rendering wait for JS-heavy pages
        #[arg(short, long)]
        dynamic: bool,

        /// Timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
    },
    /// Mark articles as read
    Read {
        /// Article IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Mark articles as starred
    Star {
        /// Article IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// List subscriptions with unread counts
    Subs,
}
