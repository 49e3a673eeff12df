//! Run statistics
//!
//! A [`CrawlSummary`] is tallied from the record stream as it is emitted, so it
//! always agrees with what the sink saw.

use crate::output::{CrawlRecord, OutcomeKind};
use crate::url::display_host;
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

/// Summary statistics for a crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// Number of records emitted (one per admitted address)
    pub total_pages: u64,

    /// Count of records by outcome
    pub outcomes: BTreeMap<OutcomeKind, u64>,

    /// Hosts seen, with any `www.` prefix stripped
    pub hosts: HashSet<String>,

    /// Depth breakdown (depth -> count)
    pub depth_breakdown: BTreeMap<u32, u64>,

    /// Total links extracted from successful pages
    pub total_links: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record to the tallies
    pub fn tally(&mut self, record: &CrawlRecord) {
        self.total_pages += 1;
        *self.outcomes.entry(record.outcome).or_insert(0) += 1;
        *self.depth_breakdown.entry(record.depth).or_insert(0) += 1;

        if let Some(host) = display_host(&record.address) {
            self.hosts.insert(host);
        }
    }

    /// Adds links extracted from a successful page
    pub fn add_links(&mut self, count: usize) {
        self.total_links += count as u64;
    }

    /// Number of records with the given outcome
    pub fn count(&self, outcome: OutcomeKind) -> u64 {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn unique_hosts(&self) -> usize {
        self.hosts.len()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        (self.count(OutcomeKind::Success) as f64 / self.total_pages as f64) * 100.0
    }

    /// Returns the share of request failures as a percentage
    pub fn error_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        let errors: u64 = OutcomeKind::ALL
            .iter()
            .filter(|kind| kind.is_error())
            .map(|kind| self.count(*kind))
            .sum();
        (errors as f64 / self.total_pages as f64) * 100.0
    }
}

/// Prints crawl statistics to stdout
pub fn print_summary(summary: &CrawlSummary) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages visited: {}", summary.total_pages);
    println!("  Unique hosts: {}", summary.unique_hosts());
    println!("  Links extracted: {}", summary.total_links);
    println!("  Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    println!("Pages by Outcome:");
    for kind in OutcomeKind::ALL {
        let count = summary.count(kind);
        if count == 0 {
            continue;
        }
        let percentage = (count as f64 / summary.total_pages as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", kind, count, percentage);
    }
    println!();

    if !summary.depth_breakdown.is_empty() {
        println!("Pages by Depth:");
        for (depth, count) in &summary.depth_breakdown {
            println!("  {}: {}", depth, count);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched successfully)",
        summary.success_rate(),
        summary.count(OutcomeKind::Success),
        summary.total_pages
    );
    println!("Error Rate: {:.1}%", summary.error_rate());
}
