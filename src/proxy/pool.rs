use crate::crawler::build_http_client;
use crate::proxy::{ProxyRecord, ProxyState};
use futures::future::join_all;
use rand::seq::SliceRandom;
use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// A validated proxy ready to carry fetches
#[derive(Debug, Clone)]
pub struct Egress {
    /// Endpoint the client is routed through
    pub endpoint: String,

    /// HTTP client with the proxy installed
    pub client: Client,
}

/// Pool of candidate proxies, validated once per run
///
/// Records are probed by [`ProxyPool::validate_all`] and are read-only
/// afterwards, so the pool can be shared without locking once validation has
/// finished.
#[derive(Debug, Default)]
pub struct ProxyPool {
    records: Vec<ProxyRecord>,
    valid: Vec<Egress>,
}

impl ProxyPool {
    /// Creates a pool of untested candidates
    pub fn new<I, S>(candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: candidates.into_iter().map(ProxyRecord::new).collect(),
            valid: Vec::new(),
        }
    }

    /// Probes every untested candidate concurrently against `test_target`
    ///
    /// A candidate becomes `Valid` if a GET of `test_target` through it returns
    /// a 2xx status within `timeout`, and `Invalid` otherwise. Records that
    /// already carry a result are not probed again.
    pub async fn validate_all(&mut self, test_target: &Url, timeout: Duration) {
        let untested: Vec<(usize, String)> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| record.state == ProxyState::Untested)
            .map(|(index, record)| (index, record.endpoint.clone()))
            .collect();

        if untested.is_empty() {
            return;
        }

        let probes = untested.into_iter().map(|(index, endpoint)| async move {
            let result = probe(&endpoint, test_target, timeout).await;
            (index, endpoint, result)
        });

        for (index, endpoint, result) in join_all(probes).await {
            match result {
                Ok(client) => {
                    tracing::info!("Proxy {} is valid", endpoint);
                    self.records[index].settle(true);
                    self.valid.push(Egress { endpoint, client });
                }
                Err(reason) => {
                    tracing::warn!("Proxy {} failed: {}", endpoint, reason);
                    self.records[index].settle(false);
                }
            }
        }

        tracing::info!(
            "Validated proxies: {} of {}",
            self.valid.len(),
            self.records.len()
        );
        if self.valid.is_empty() {
            tracing::error!("No working proxies found");
        }
    }

    /// Returns a uniformly random validated egress, or `None` if there is none
    pub fn next_egress(&self) -> Option<Egress> {
        self.valid.choose(&mut rand::thread_rng()).cloned()
    }

    /// All candidate records with their current state
    pub fn records(&self) -> &[ProxyRecord] {
        &self.records
    }

    /// State of a candidate, if it is part of the pool
    pub fn state_of(&self, endpoint: &str) -> Option<ProxyState> {
        self.records
            .iter()
            .find(|record| record.endpoint == endpoint)
            .map(|record| record.state)
    }

    /// Number of validated endpoints
    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    /// Returns true if no candidates were configured
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Builds a client through `endpoint` and checks it can reach `test_target`
async fn probe(endpoint: &str, test_target: &Url, timeout: Duration) -> Result<Client, String> {
    let proxy = Proxy::all(endpoint).map_err(|e| format!("unusable endpoint: {}", e))?;
    let client = build_http_client(Some(proxy)).map_err(|e| e.to_string())?;

    let response = client
        .get(test_target.clone())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                "probe timed out".to_string()
            } else {
                e.to_string()
            }
        })?;

    let status = response.status();
    if status.is_success() {
        Ok(client)
    } else {
        Err(format!("probe returned HTTP {}", status.as_u16()))
    }
}
