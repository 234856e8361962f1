use std::sync::Arc;

use dashmap::DashSet;

/// Shared record of which URLs have been claimed for processing
///
/// Every concurrently-running crawl task shares one ledger for the
/// duration of a crawl. `claim` is the only write path, and it is a
/// single atomic step: two branches racing to claim the same URL can
/// never both succeed, which is what keeps a URL reachable over several
/// paths (or through a cycle) from being processed twice.
///
/// Cloning a ledger clones the handle, not the contents.
#[derive(Debug, Clone, Default)]
pub struct VisitLedger {
    claimed: Arc<DashSet<String>>,
}

impl VisitLedger {
    /// Create an empty ledger for a new crawl
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a URL for processing. Returns true if this caller is the
    /// first to claim it; false if it was already claimed. Never fails.
    pub fn claim(&self, url: &str) -> bool {
        self.claimed.insert(url.to_string())
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// True if no URL has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
