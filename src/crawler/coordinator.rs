//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns the frontier and drives a bounded pool of expansion
//! tasks. One loop iteration dispatches every target a free permit allows,
//! then waits for the next expansion to finish and handles its outcome:
//!
//! 1. Targets beyond the depth bound are dropped.
//! 2. The target is claimed in the visited set; a lost claim drops it.
//! 3. The spawned expansion consults the compliance gate, sleeps a random
//!    jitter, picks an identity and egress, and fetches.
//! 4. The finished expansion is recorded, and on success its links become
//!    children one level deeper, unless the target already sits at the bound.
//!    A redirect queues its location at the same depth, so the location goes
//!    through the claim and the gate like any other address.
//!
//! Failures stay inside the expansion that produced them. A panicking task is
//! logged and the remaining work carries on.

use crate::crawler::scheduler::{ScheduledTarget, Scheduler};
use crate::crawler::session::{CrawlSession, EgressChoice, NO_EGRESS_CAUSE};
use crate::crawler::FetchOutcome;
use crate::output::{CrawlRecord, CrawlSummary, RecordSink};
use crate::robots::PolicyDecision;
use crate::state::CrawlTarget;
use crate::url::{normalize_parsed, normalize_url};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use url::Url;

/// A finished expansion, handed back to the coordinator loop
#[derive(Debug)]
pub struct ExpansionResult {
    pub target: CrawlTarget,
    pub outcome: FetchOutcome,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    session: Arc<CrawlSession>,
    scheduler: Scheduler,
    tasks: JoinSet<ExpansionResult>,
    summary: CrawlSummary,
    max_depth: u32,
}

impl Coordinator {
    /// Creates a coordinator seeded from the session's configuration
    ///
    /// Seeds that are not absolute `http`/`https` addresses are logged and
    /// skipped.
    pub fn new(session: Arc<CrawlSession>) -> Self {
        let crawler = &session.config().crawler;
        let seeds = seed_targets(&session.config().seeds);
        let scheduler = Scheduler::new(crawler.max_in_flight as usize, seeds);
        let max_depth = crawler.max_depth;

        Self {
            session,
            scheduler,
            tasks: JoinSet::new(),
            summary: CrawlSummary::new(),
            max_depth,
        }
    }

    /// Runs the crawl until the depth-bounded reachable set is exhausted
    ///
    /// Every admitted address produces exactly one record on `sink`. The
    /// returned summary tallies the same records.
    pub async fn run(mut self, sink: &dyn RecordSink) -> CrawlSummary {
        tracing::info!(
            "Starting crawl: {} seeds, max depth {}, max in flight {}",
            self.scheduler.frontier_size(),
            self.max_depth,
            self.scheduler.max_in_flight()
        );

        let start_time = Instant::now();

        loop {
            self.dispatch();

            // Nothing in flight after dispatching means the frontier is empty
            let Some(joined) = self.tasks.join_next().await else {
                break;
            };

            match joined {
                Ok(result) => self.complete(result, sink),
                Err(e) => tracing::error!("Expansion task failed: {}", e),
            }
        }

        self.summary.elapsed = start_time.elapsed();
        tracing::info!(
            "Crawl complete: {} pages in {:.2}s, {} addresses claimed",
            self.summary.total_pages,
            self.summary.elapsed.as_secs_f64(),
            self.session.visited().len()
        );

        self.summary
    }

    /// Spawns expansions for frontier targets while permits are free
    fn dispatch(&mut self) {
        while let Some(ScheduledTarget { target, permit }) = self.scheduler.try_next() {
            if target.exceeds(self.max_depth) {
                tracing::debug!("Depth bound reached, skipping {}", target);
                continue;
            }

            if !self.session.visited().claim(&target.url) {
                tracing::trace!("Already visited, skipping {}", target);
                continue;
            }

            let crawler = &self.session.config().crawler;
            let delay = jitter_delay(crawler.min_delay_ms, crawler.max_delay_ms);
            let session = Arc::clone(&self.session);

            tracing::debug!("Expanding {}", target);
            self.tasks.spawn(async move {
                let outcome = expand(&session, &target, delay).await;
                drop(permit);
                ExpansionResult { target, outcome }
            });
        }
    }

    /// Records a finished expansion and queues its children
    fn complete(&mut self, result: ExpansionResult, sink: &dyn RecordSink) {
        let record = CrawlRecord::from_outcome(&result.target, &result.outcome);
        sink.record(&record);
        self.summary.tally(&record);

        if self.summary.total_pages % 10 == 0 {
            tracing::info!(
                "Progress: {} pages crawled, {} in frontier, {} in flight",
                self.summary.total_pages,
                self.scheduler.frontier_size(),
                self.scheduler.in_flight()
            );
        }

        let links = match result.outcome {
            FetchOutcome::Success { links, .. } => links,
            FetchOutcome::Redirect { location, .. } => {
                self.follow_redirect(&result.target, location);
                return;
            }
            _ => return,
        };
        self.summary.add_links(links.len());

        if !result.target.can_expand(self.max_depth) {
            tracing::trace!(
                "Not following {} links from {}: depth bound",
                links.len(),
                result.target
            );
            return;
        }

        let mut queued = 0;
        for link in links {
            let url = match normalize_parsed(link) {
                Ok(url) => url,
                Err(e) => {
                    tracing::trace!("Skipping link from {}: {}", result.target.url, e);
                    continue;
                }
            };

            // The claim at dispatch is authoritative; this only keeps the queue short
            if self.session.visited().contains(&url) {
                continue;
            }

            self.scheduler.add_to_frontier(result.target.child(url));
            queued += 1;
        }

        tracing::debug!("Queued {} children of {}", queued, result.target);
    }

    /// Queues a redirect location at the depth of the address that answered
    fn follow_redirect(&mut self, target: &CrawlTarget, location: Url) {
        let url = match normalize_parsed(location) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Not following redirect from {}: {}", target.url, e);
                return;
            }
        };

        if self.session.visited().contains(&url) {
            tracing::trace!("Redirect from {} to visited {}", target.url, url);
            return;
        }

        let redirected = CrawlTarget {
            url,
            depth: target.depth,
        };
        tracing::debug!("Following redirect from {} to {}", target.url, redirected);
        self.scheduler.add_to_frontier(redirected);
    }
}

/// Gate check, jitter, identity and egress selection, then one fetch
async fn expand(session: &CrawlSession, target: &CrawlTarget, delay: Duration) -> FetchOutcome {
    let config = session.config();

    match session
        .gate()
        .check(&target.url, &config.identity.policy_token)
        .await
    {
        PolicyDecision::Allowed => {}
        PolicyDecision::Disallowed => return FetchOutcome::Blocked,
        PolicyDecision::PolicyUnavailable { reason } => {
            tracing::debug!("No robots.txt policy for {} ({}), allowing", target.url, reason);
        }
    }

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let egress = match session.select_egress() {
        EgressChoice::Proxy(egress) => {
            tracing::trace!("Fetching {} through {}", target.url, egress.endpoint);
            Some(egress)
        }
        EgressChoice::Direct => None,
        EgressChoice::Unavailable => {
            return FetchOutcome::NetworkError {
                cause: NO_EGRESS_CAUSE.to_string(),
            }
        }
    };

    let identity = session.identities().next_identity();
    session
        .fetcher()
        .fetch(
            &target.url,
            identity,
            egress.as_ref(),
            config.crawler.request_timeout(),
        )
        .await
}

/// Picks a uniformly random delay in `[min_ms, max_ms]`
pub fn jitter_delay(min_ms: u64, max_ms: u64) -> Duration {
    if max_ms <= min_ms {
        return Duration::from_millis(min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
}

/// Normalizes seed strings into depth-0 targets, skipping bad ones
fn seed_targets(seeds: &[String]) -> Vec<CrawlTarget> {
    seeds
        .iter()
        .filter_map(|seed| match normalize_url(seed) {
            Ok(url) => Some(CrawlTarget::seed(url)),
            Err(e) => {
                tracing::warn!("Skipping seed {}: {}", seed, e);
                None
            }
        })
        .collect()
}
