use std::fmt;
use url::Url;

/// An address queued for expansion
///
/// Seeds are created at depth 0; every child discovered on a page at depth `d`
/// is created at depth `d + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// Normalized address to fetch
    pub url: Url,

    /// Number of link hops from the seed that discovered this address
    pub depth: u32,
}

impl CrawlTarget {
    /// Creates a seed target (depth 0)
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// Creates a target one hop below `self`
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }

    /// Returns true if the target lies beyond the depth bound
    pub fn exceeds(&self, max_depth: u32) -> bool {
        self.depth > max_depth
    }

    /// Returns true if links found on this target may still be followed
    pub fn can_expand(&self, max_depth: u32) -> bool {
        self.depth < max_depth
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [depth {}]", self.url, self.depth)
    }
}
