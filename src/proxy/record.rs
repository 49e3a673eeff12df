use std::fmt;

/// Validation state of a proxy endpoint
///
/// `Untested` moves to `Valid` or `Invalid` exactly once; both are terminal
/// for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyState {
    /// Not probed yet
    Untested,

    /// Probe succeeded; the endpoint may carry fetches
    Valid,

    /// Probe failed, timed out, or the endpoint is unusable
    Invalid,
}

impl ProxyState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Untested)
    }
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Untested => "untested",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        };
        write!(f, "{}", s)
    }
}

/// A candidate proxy endpoint and its validation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRecord {
    /// Endpoint in `scheme://[user:pass@]host:port` form
    pub endpoint: String,

    pub state: ProxyState,
}

impl ProxyRecord {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: ProxyState::Untested,
        }
    }

    /// Records the validation result; a record that already has a result is left alone
    pub fn settle(&mut self, valid: bool) {
        if self.state.is_terminal() {
            return;
        }
        self.state = if valid {
            ProxyState::Valid
        } else {
            ProxyState::Invalid
        };
    }
}
