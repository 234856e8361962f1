pub mod html;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::ParseError;

// Re-export common types
pub use html::HtmlPageParser;

/// Everything a crawl needs from one fetched page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    /// Outbound links discovered on the page, resolved to absolute URLs
    pub links: Vec<String>,

    /// Occurrences of each counted word in the page's visible text
    pub word_counts: HashMap<String, u64>,
}

/// Fetches a page and reduces it to links and word counts
///
/// The crawl engine treats this as its only window onto the network: one
/// call per URL, yielding either the page's data or a per-URL error the
/// engine can recover from. Implementations are shared across every
/// concurrent crawl branch and must not require outside synchronization.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageParser: Send + Sync {
    /// Fetch and parse a single page
    async fn parse(&self, url: &str) -> Result<PageData, ParseError>;
}
