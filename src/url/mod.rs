//! URL handling module for Veil
//!
//! This module provides address normalization (the key used by the visited set)
//! and origin/host helpers used by the compliance gate and the summary.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{display_host, origin_key, policy_url};
pub use normalize::{normalize_parsed, normalize_url};
