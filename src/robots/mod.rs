//! Robots.txt handling module
//!
//! This module provides the compliance gate: it fetches, parses and caches
//! robots.txt per origin and answers whether an address may be crawled.
//!
//! The gate fails open. When an origin's robots.txt cannot be retrieved
//! (network failure, non-2xx status, unreadable body) every address on that
//! origin is allowed, and the decision is reported as
//! [`PolicyDecision::PolicyUnavailable`] so callers can tell it apart from an
//! explicit allow.

mod cache;
mod parser;

pub use cache::{CachedPolicy, PolicyCache, PolicyRules};
pub use parser::ParsedRobots;

use crate::identity::IdentityRotator;
use crate::url::{origin_key, policy_url};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Result of evaluating an address against its origin's policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The policy permits the address
    Allowed,

    /// The policy forbids the address
    Disallowed,

    /// No policy could be retrieved for the origin
    PolicyUnavailable {
        /// Why the policy is unavailable
        reason: String,
    },
}

impl PolicyDecision {
    /// Whether crawling may proceed; an unavailable policy permits crawling
    pub fn permits(&self) -> bool {
        match self {
            Self::Allowed | Self::PolicyUnavailable { .. } => true,
            Self::Disallowed => false,
        }
    }
}

/// Compliance gate that decides whether an address may be crawled
#[derive(Debug)]
pub struct ComplianceGate {
    client: Client,
    identities: Arc<IdentityRotator>,
    cache: PolicyCache,
    timeout: Duration,
}

impl ComplianceGate {
    /// Creates a gate that fetches policies with `client`
    ///
    /// Each policy request presents an identity drawn from `identities` and is
    /// bounded by `timeout`.
    pub fn new(client: Client, identities: Arc<IdentityRotator>, timeout: Duration) -> Self {
        Self {
            client,
            identities,
            cache: PolicyCache::new(),
            timeout,
        }
    }

    /// Evaluates `url` for `agent`, fetching the origin's policy on first use
    pub async fn check(&self, url: &Url, agent: &str) -> PolicyDecision {
        let (Some(origin), Some(robots_url)) = (origin_key(url), policy_url(url)) else {
            return PolicyDecision::PolicyUnavailable {
                reason: format!("no origin for {}", url),
            };
        };

        let policy = self
            .cache
            .get_or_fetch(&origin, || self.fetch_policy(robots_url))
            .await;

        match &policy.rules {
            PolicyRules::Compiled(robots) => {
                if robots.is_allowed(url.as_str(), agent) {
                    PolicyDecision::Allowed
                } else {
                    PolicyDecision::Disallowed
                }
            }
            PolicyRules::Unavailable { reason } => PolicyDecision::PolicyUnavailable {
                reason: reason.clone(),
            },
        }
    }

    /// Returns true if `url` may be crawled by `agent`
    pub async fn is_allowed(&self, url: &Url, agent: &str) -> bool {
        self.check(url, agent).await.permits()
    }

    /// The per-origin policy cache
    pub fn cache(&self) -> &PolicyCache {
        &self.cache
    }

    /// Fetches and compiles one robots.txt
    async fn fetch_policy(&self, robots_url: Url) -> PolicyRules {
        tracing::debug!("Fetching robots.txt: {}", robots_url);

        let response = match self
            .client
            .get(robots_url.clone())
            .header(USER_AGENT, self.identities.next_identity())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Error fetching robots.txt {}: {}", robots_url, e);
                return PolicyRules::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                "Failed to fetch robots.txt {} (status code: {})",
                robots_url,
                status.as_u16()
            );
            return PolicyRules::Unavailable {
                reason: format!("HTTP {}", status.as_u16()),
            };
        }

        match response.text().await {
            Ok(body) => PolicyRules::Compiled(ParsedRobots::from_content(&body)),
            Err(e) => {
                tracing::warn!("Unreadable robots.txt {}: {}", robots_url, e);
                PolicyRules::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}
