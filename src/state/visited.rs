use dashmap::DashSet;
use url::Url;

/// Set of normalized addresses already admitted for fetch
///
/// [`VisitedSet::claim`] is the only admission point. The check and the insert
/// happen under one shard lock, so two expansions racing for the same address
/// cannot both win.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims an address for fetching
    ///
    /// Returns `true` if the caller won the address and must fetch it, `false`
    /// if it was already claimed earlier in this run.
    pub fn claim(&self, url: &Url) -> bool {
        self.inner.insert(url.as_str().to_owned())
    }

    /// Returns true if the address has already been claimed
    pub fn contains(&self, url: &Url) -> bool {
        self.inner.contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
