//! Output module for the crawl record stream and run statistics
//!
//! This module handles:
//! - The [`RecordSink`] interface and its built-in implementations
//! - Tallying records into a [`CrawlSummary`]
//! - Printing the end-of-run statistics

mod sinks;
pub mod stats;
mod traits;

pub use sinks::{LogSink, MemorySink};
pub use stats::{print_summary, CrawlSummary};
pub use traits::{CrawlRecord, OutcomeKind, RecordSink};
