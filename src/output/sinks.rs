//! Built-in record sinks

use crate::output::{CrawlRecord, OutcomeKind, RecordSink};
use std::sync::Mutex;

/// Writes every record as a tracing event
///
/// Successes, redirects and blocked addresses are logged at INFO, HTTP errors at WARN,
/// network errors and timeouts at ERROR.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RecordSink for LogSink {
    fn record(&self, record: &CrawlRecord) {
        let address = record.address.as_str();
        let depth = record.depth;

        match record.outcome {
            OutcomeKind::Success => tracing::info!(
                "Fetched {} [depth {}] status={} title={:?}",
                address,
                depth,
                record.status.unwrap_or_default(),
                record.title.as_deref().unwrap_or_default()
            ),
            OutcomeKind::Redirect => tracing::info!(
                "Redirect {} [depth {}] status={} location={}",
                address,
                depth,
                record.status.unwrap_or_default(),
                record.location.as_ref().map(|l| l.as_str()).unwrap_or("unknown")
            ),
            OutcomeKind::Blocked => {
                tracing::info!("Blocked by robots.txt: {} [depth {}]", address, depth)
            }
            OutcomeKind::HttpError => tracing::warn!(
                "HTTP error {} [depth {}] status={}",
                address,
                depth,
                record.status.unwrap_or_default()
            ),
            OutcomeKind::NetworkError => tracing::error!(
                "Network error {} [depth {}]: {}",
                address,
                depth,
                record.cause.as_deref().unwrap_or("unknown")
            ),
            OutcomeKind::Timeout => tracing::error!("Timed out {} [depth {}]", address, depth),
        }
    }
}

/// Keeps every record in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<CrawlRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the records collected so far
    pub fn records(&self) -> Vec<CrawlRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Records whose address has the given path
    pub fn with_path(&self, path: &str) -> Vec<CrawlRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.address.path() == path)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn record(&self, record: &CrawlRecord) {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.push(record.clone());
    }
}
