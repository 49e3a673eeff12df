//! Proxy egress module
//!
//! Candidate proxy endpoints are probed once per run against a test target.
//! Only endpoints that answered successfully are handed out for fetching; the
//! pool never substitutes a direct connection on its own.

mod pool;
mod record;

pub use pool::{Egress, ProxyPool};
pub use record::{ProxyRecord, ProxyState};
