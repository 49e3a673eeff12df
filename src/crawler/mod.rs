//! Crawler module for fetching, parsing and orchestration
//!
//! This module contains the core crawling logic, including:
//! - The fetch executor and HTTP client construction
//! - HTML parsing and link extraction
//! - The frontier queue and in-flight bound
//! - The per-run session and the coordinator loop

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod session;

pub use coordinator::{jitter_delay, Coordinator, ExpansionResult};
pub use fetcher::{build_http_client, FetchOutcome, Fetcher, NO_TITLE};
pub use parser::{extract_links, parse_html, ParsedPage};
pub use scheduler::{ScheduledTarget, Scheduler};
pub use session::{CrawlSession, EgressChoice, NO_EGRESS_CAUSE};

use crate::config::Config;
use crate::output::{CrawlSummary, RecordSink};
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the session (HTTP clients, identity pool, proxy validation)
/// 2. Seed the frontier from the configuration
/// 3. Expand targets until the depth-bounded reachable set is exhausted
/// 4. Send one record per admitted address to `sink`
///
/// # Errors
///
/// Only setup can fail. Per-address failures are recorded, never returned.
pub async fn crawl(config: Config, sink: &dyn RecordSink) -> crate::Result<CrawlSummary> {
    let session = Arc::new(CrawlSession::build(config).await?);
    Ok(Coordinator::new(session).run(sink).await)
}
