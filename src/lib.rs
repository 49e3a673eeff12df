//! Veil: a depth-bounded, policy-aware web crawler
//!
//! This crate crawls the web from a set of seed addresses, following links up to
//! a bounded depth while respecting robots.txt, visiting every address at most
//! once, and rotating its request identity and proxy egress.

pub mod config;
pub mod crawler;
pub mod identity;
pub mod output;
pub mod proxy;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawl setup
///
/// Failures of individual addresses are never surfaced through this type; they
/// are recorded as [`crawler::FetchOutcome`] values instead.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for crawl setup operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, Coordinator, CrawlSession, FetchOutcome};
pub use output::{CrawlRecord, CrawlSummary, LogSink, MemorySink, RecordSink};
pub use state::{CrawlTarget, VisitedSet};
pub use crate::url::normalize_url;
