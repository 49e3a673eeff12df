//! Configuration module for Veil
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to its defaults.
//!
//! # Example
//!
//! ```no_run
//! use veil_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("veil.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, IdentityConfig, ProxyConfig, DEFAULT_PROXY_TEST_TARGET};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
