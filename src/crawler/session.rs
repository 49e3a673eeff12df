//! Per-run crawl context
//!
//! A [`CrawlSession`] owns everything one crawl run shares between its
//! expansions: configuration, the visited set, the compliance gate with its
//! policy cache, the identity rotator, the validated proxy pool and the fetch
//! executor. Nothing is global, so independent sessions can run side by side
//! in one process.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::identity::IdentityRotator;
use crate::proxy::{Egress, ProxyPool};
use crate::robots::ComplianceGate;
use crate::state::VisitedSet;
use std::sync::Arc;
use url::Url;

/// Cause recorded when a fetch needs a proxy and none validated
pub const NO_EGRESS_CAUSE: &str = "no egress available";

/// How a single fetch should leave the machine
#[derive(Debug, Clone)]
pub enum EgressChoice {
    /// Through a validated proxy
    Proxy(Egress),

    /// On the direct client
    Direct,

    /// No proxy is available and direct connections are not allowed
    Unavailable,
}

/// Shared state for one crawl run
#[derive(Debug)]
pub struct CrawlSession {
    config: Config,
    visited: VisitedSet,
    gate: ComplianceGate,
    identities: Arc<IdentityRotator>,
    proxies: ProxyPool,
    fetcher: Fetcher,
}

impl CrawlSession {
    /// Builds a session from a validated configuration
    ///
    /// Proxy candidates are probed here, so validation has fully finished
    /// before the first fetch can ask the pool for an egress.
    ///
    /// # Errors
    ///
    /// Fails if an HTTP client cannot be built or the proxy test target is not
    /// a valid URL.
    pub async fn build(config: Config) -> crate::Result<Self> {
        let identities = Arc::new(IdentityRotator::from_config(&config.identity));
        let direct = build_http_client(None)?;

        // Policy files are always fetched on the direct client
        let gate = ComplianceGate::new(
            direct.clone(),
            Arc::clone(&identities),
            config.crawler.request_timeout(),
        );

        let mut proxies = ProxyPool::new(config.proxy.endpoints.iter().cloned());
        if !proxies.is_empty() {
            let test_target = Url::parse(&config.proxy.test_target)?;
            tracing::info!(
                "Validating {} proxies against {}",
                proxies.records().len(),
                test_target
            );
            proxies
                .validate_all(&test_target, config.proxy.validation_timeout())
                .await;
        }

        Ok(Self {
            config,
            visited: VisitedSet::new(),
            gate,
            identities,
            proxies,
            fetcher: Fetcher::new(direct),
        })
    }

    /// Picks the egress for one fetch
    ///
    /// Falls back to a direct connection when the pool has nothing to offer,
    /// unless the configuration requires a proxy.
    pub fn select_egress(&self) -> EgressChoice {
        match self.proxies.next_egress() {
            Some(egress) => EgressChoice::Proxy(egress),
            None if self.config.proxy.require_proxy => EgressChoice::Unavailable,
            None => EgressChoice::Direct,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn gate(&self) -> &ComplianceGate {
        &self.gate
    }

    pub fn identities(&self) -> &IdentityRotator {
        &self.identities
    }

    pub fn proxies(&self) -> &ProxyPool {
        &self.proxies
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }
}
