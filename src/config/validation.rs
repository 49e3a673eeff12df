use crate::config::types::{Config, CrawlerConfig, IdentityConfig, ProxyConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use url::Url;

/// Upper bound for `max-in-flight`
const MAX_IN_FLIGHT_LIMIT: u32 = 1024;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seeds(&config.seeds)?;
    validate_crawler_config(&config.crawler)?;
    validate_identity_config(&config.identity)?;
    validate_proxy_config(&config.proxy)?;
    Ok(())
}

/// Validates seed addresses
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        validate_http_url(seed, "seed")?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_in_flight < 1 || config.max_in_flight > MAX_IN_FLIGHT_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-in-flight must be between 1 and {}, got {}",
            MAX_IN_FLIGHT_LIMIT, config.max_in_flight
        )));
    }

    if config.request_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-ms must be >= 1ms".to_string(),
        ));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min-delay-ms ({}) must not exceed max-delay-ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates identity configuration
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.policy_token.trim().is_empty() {
        return Err(ConfigError::Validation(
            "policy-token cannot be empty".to_string(),
        ));
    }

    if let Some(agents) = &config.user_agents {
        if agents.is_empty() {
            return Err(ConfigError::Validation(
                "user-agents must contain at least one entry when given".to_string(),
            ));
        }

        if agents.iter().any(|agent| agent.trim().is_empty()) {
            return Err(ConfigError::Validation(
                "user-agents cannot contain empty entries".to_string(),
            ));
        }

        // Each entry is sent verbatim as a User-Agent header
        if let Some(agent) = agents.iter().find(|a| HeaderValue::from_str(a).is_err()) {
            return Err(ConfigError::Validation(format!(
                "user-agent {:?} is not a valid header value",
                agent
            )));
        }
    }

    Ok(())
}

/// Validates proxy configuration
fn validate_proxy_config(config: &ProxyConfig) -> Result<(), ConfigError> {
    for endpoint in &config.endpoints {
        validate_proxy_endpoint(endpoint)?;
    }

    validate_http_url(&config.test_target, "proxy test-target")?;

    if config.validation_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "validation-timeout-ms must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}

/// Validates a proxy endpoint of the form `http[s]://[user:pass@]host:port`
fn validate_proxy_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid proxy endpoint '{}': {}", endpoint, e))
    })?;

    // The HTTP client is built without SOCKS support
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Proxy endpoint '{}' must use the http or https scheme",
            endpoint
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy endpoint '{}' has no host",
            endpoint
        )));
    }

    if url.port_or_known_default().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Proxy endpoint '{}' has no port",
            endpoint
        )));
    }

    Ok(())
}

/// Checks that a string is an absolute http(s) URL with a host
fn validate_http_url(value: &str, what: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use the http or https scheme",
            what, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            what, value
        )));
    }

    Ok(())
}
