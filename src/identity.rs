//! Request identity rotation
//!
//! Every request presents a User-Agent drawn at random from a pool of common
//! browser signatures. Selection is independent per call: there is no cursor,
//! so two consecutive requests may carry the same identity.

use crate::config::IdentityConfig;
use rand::seq::SliceRandom;

/// Built-in pool of desktop and mobile browser signatures
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.2478.67",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Safari/605.1.15",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4.1 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.6367.82 Mobile Safari/537.36",
    "Mozilla/5.0 (iPad; CPU OS 17_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Mobile/15E148 Safari/604.1",
];

/// Stateless random rotator over a pool of User-Agent values
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    pool: Vec<String>,
}

impl IdentityRotator {
    /// Creates a rotator over `pool`; an empty pool falls back to the built-in one
    pub fn new(pool: Vec<String>) -> Self {
        if pool.is_empty() {
            return Self::default();
        }
        Self { pool }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        match &config.user_agents {
            Some(agents) => Self::new(agents.clone()),
            None => Self::default(),
        }
    }

    /// Returns a uniformly random identity from the pool
    pub fn next_identity(&self) -> &str {
        self.pool
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }
}

impl Default for IdentityRotator {
    fn default() -> Self {
        Self {
            pool: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}
