//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlTarget`: an address waiting to be expanded, with its link depth
//! - `VisitedSet`: the normalized addresses already admitted for fetch in one run

mod target;
mod visited;

// Re-export main types
pub use target::CrawlTarget;
pub use visited::VisitedSet;
