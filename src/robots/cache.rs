//! Per-origin robots.txt cache
//!
//! Entries are populated lazily on the first query for an origin and are kept
//! for the rest of the run; there is no expiry.

use crate::robots::ParsedRobots;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Outcome of retrieving an origin's robots.txt
#[derive(Debug, Clone)]
pub enum PolicyRules {
    /// The policy was fetched and compiled
    Compiled(ParsedRobots),

    /// The policy could not be retrieved; evaluation fails open
    Unavailable {
        /// Why the policy is unavailable (network error, HTTP status, ...)
        reason: String,
    },
}

/// Cached robots.txt data for an origin
#[derive(Debug, Clone)]
pub struct CachedPolicy {
    /// The compiled rules, or the reason they are unavailable
    pub rules: PolicyRules,

    /// When the robots.txt was fetched
    pub fetched_at: DateTime<Utc>,
}

impl CachedPolicy {
    /// Creates a new CachedPolicy stamped with the current time
    pub fn new(rules: PolicyRules) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
        }
    }
}

/// Map from origin to its cached policy
///
/// Each origin owns a once-cell, so concurrent first queries for the same origin
/// trigger a single fetch; the other callers wait for its result.
#[derive(Debug, Default)]
pub struct PolicyCache {
    entries: DashMap<String, Arc<OnceCell<Arc<CachedPolicy>>>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached policy for `origin`, running `fetch` if it is missing
    pub async fn get_or_fetch<F, Fut>(&self, origin: &str, fetch: F) -> Arc<CachedPolicy>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PolicyRules>,
    {
        // Clone the cell out so the shard lock is released before awaiting
        let cell = self
            .entries
            .entry(origin.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_init(|| async move { Arc::new(CachedPolicy::new(fetch().await)) })
            .await
            .clone()
    }

    /// Number of origins with a populated policy
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
