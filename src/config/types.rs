use serde::Deserialize;
use std::time::Duration;

/// Default probe target used to check that a proxy forwards traffic
pub const DEFAULT_PROXY_TEST_TARGET: &str = "https://httpbin.org/ip";

/// Main configuration structure for Veil
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed addresses the crawl starts from (depth 0)
    pub seeds: Vec<String>,

    pub crawler: CrawlerConfig,

    pub identity: IdentityConfig,

    pub proxy: ProxyConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth from a seed; pages at this depth are fetched but not expanded
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of expansions (robots check + fetch) running at once
    #[serde(rename = "max-in-flight")]
    pub max_in_flight: u32,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Lower bound of the random delay applied before each fetch (milliseconds)
    #[serde(rename = "min-delay-ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the random delay applied before each fetch (milliseconds)
    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_in_flight: 16,
            request_timeout_ms: 10_000,
            min_delay_ms: 1_000,
            max_delay_ms: 2_000,
        }
    }
}

/// Request identity configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Agent token robots.txt rules are evaluated for
    #[serde(rename = "policy-token")]
    pub policy_token: String,

    /// Replacement pool of User-Agent values; `None` keeps the built-in pool
    #[serde(rename = "user-agents")]
    pub user_agents: Option<Vec<String>>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            policy_token: "*".to_string(),
            user_agents: None,
        }
    }
}

/// Proxy egress configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Candidate endpoints in `scheme://[user:pass@]host:port` form
    pub endpoints: Vec<String>,

    /// Address every candidate is probed against
    #[serde(rename = "test-target")]
    pub test_target: String,

    /// Probe timeout (milliseconds)
    #[serde(rename = "validation-timeout-ms")]
    pub validation_timeout_ms: u64,

    /// Refuse to fetch directly when no validated proxy is available
    #[serde(rename = "require-proxy")]
    pub require_proxy: bool,
}

impl ProxyConfig {
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            test_target: DEFAULT_PROXY_TEST_TARGET.to_string(),
            validation_timeout_ms: 10_000,
            require_proxy: false,
        }
    }
}
