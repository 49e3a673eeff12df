//! Record sink trait and record types
//!
//! Every admitted address produces exactly one [`CrawlRecord`], handed to a
//! [`RecordSink`] in completion order.

use crate::crawler::FetchOutcome;
use crate::state::CrawlTarget;
use chrono::{DateTime, Utc};
use std::fmt;
use url::Url;

/// Outcome of an admitted address, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutcomeKind {
    Success,
    Redirect,
    Blocked,
    HttpError,
    NetworkError,
    Timeout,
}

impl OutcomeKind {
    /// All kinds in reporting order
    pub const ALL: [OutcomeKind; 6] = [
        Self::Success,
        Self::Redirect,
        Self::Blocked,
        Self::HttpError,
        Self::NetworkError,
        Self::Timeout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Redirect => "redirect",
            Self::Blocked => "blocked",
            Self::HttpError => "http-error",
            Self::NetworkError => "network-error",
            Self::Timeout => "timeout",
        }
    }

    /// Returns true for failures of the request itself
    pub fn is_error(&self) -> bool {
        matches!(self, Self::HttpError | Self::NetworkError | Self::Timeout)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&FetchOutcome> for OutcomeKind {
    fn from(outcome: &FetchOutcome) -> Self {
        match outcome {
            FetchOutcome::Success { .. } => Self::Success,
            FetchOutcome::Redirect { .. } => Self::Redirect,
            FetchOutcome::Blocked => Self::Blocked,
            FetchOutcome::HttpError { .. } => Self::HttpError,
            FetchOutcome::NetworkError { .. } => Self::NetworkError,
            FetchOutcome::Timeout => Self::Timeout,
        }
    }
}

/// One entry of the crawl record stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    /// When the expansion finished
    pub timestamp: DateTime<Utc>,

    /// The address that was admitted
    pub address: Url,

    /// Link depth of the address
    pub depth: u32,

    pub outcome: OutcomeKind,

    /// HTTP status, for `Success`, `Redirect` and `HttpError`
    pub status: Option<u16>,

    /// Page title, for `Success`
    pub title: Option<String>,

    /// Failure description, for `NetworkError`
    pub cause: Option<String>,

    /// Redirect target, for `Redirect`
    pub location: Option<Url>,
}

impl CrawlRecord {
    /// Builds the record for `target` finishing with `outcome`
    pub fn from_outcome(target: &CrawlTarget, outcome: &FetchOutcome) -> Self {
        let (status, title, cause) = match outcome {
            FetchOutcome::Success { status, title, .. } => {
                (Some(*status), Some(title.clone()), None)
            }
            FetchOutcome::Redirect { status, .. } | FetchOutcome::HttpError { status } => {
                (Some(*status), None, None)
            }
            FetchOutcome::NetworkError { cause } => (None, None, Some(cause.clone())),
            FetchOutcome::Blocked | FetchOutcome::Timeout => (None, None, None),
        };
        let location = match outcome {
            FetchOutcome::Redirect { location, .. } => Some(location.clone()),
            _ => None,
        };

        Self {
            timestamp: Utc::now(),
            address: target.url.clone(),
            depth: target.depth,
            outcome: OutcomeKind::from(outcome),
            status,
            title,
            cause,
            location,
        }
    }
}

/// Destination for crawl records
///
/// Sinks are called from the coordinator loop only, one record at a time, but
/// must be shareable so embedders can read them while a crawl runs.
pub trait RecordSink: Send + Sync {
    /// Consumes one record
    fn record(&self, record: &CrawlRecord);
}
