//! Crawl engine: one root task, recursively fanned out and joined.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::info;

use crate::cli::config::CrawlerSettings;
use crate::crawler::filter::UrlFilter;
use crate::crawler::ledger::VisitLedger;
use crate::crawler::tally::WordTally;
use crate::crawler::task::{CrawlContext, CrawlTask};
use crate::error::ConfigError;
use crate::parser::PageParser;

/// Final snapshot of one crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlResult {
    /// Total occurrences of each counted word across all processed pages
    pub word_counts: HashMap<String, u64>,

    /// Distinct URLs claimed during the crawl
    pub urls_visited: usize,
}

impl CrawlResult {
    /// The most frequent words, at most `limit` of them. Ties are broken
    /// by word length (longer first), then alphabetically.
    pub fn top_words(&self, limit: usize) -> Vec<(String, u64)> {
        let mut ranked: Vec<(String, u64)> = self
            .word_counts
            .iter()
            .map(|(word, count)| (word.clone(), *count))
            .collect();

        ranked.sort_by(|(word_a, count_a), (word_b, count_b)| {
            match count_b.cmp(count_a) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
            match word_b.len().cmp(&word_a.len()) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
            word_a.cmp(word_b)
        });

        ranked.truncate(limit);
        ranked
    }
}

/// Depth- and deadline-bounded concurrent crawl engine
///
/// The engine owns the crawl policy (depth, time budget, pool size,
/// exclusions) and the parsing collaborator. Each `crawl` call gets a
/// fresh ledger and tally, so one engine can serve many crawls.
pub struct CrawlEngine {
    max_depth: u32,
    timeout: Duration,
    parallelism: usize,
    filter: UrlFilter,
    parser: Arc<dyn PageParser>,
}

impl CrawlEngine {
    /// Validate the settings and build an engine. Zero parallelism and
    /// malformed exclusion patterns are rejected here, before anything
    /// is fetched.
    pub fn new(
        settings: &CrawlerSettings,
        parser: Arc<dyn PageParser>,
    ) -> Result<Self, ConfigError> {
        if settings.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism);
        }

        Ok(Self {
            max_depth: settings.max_depth,
            timeout: Duration::from_secs(settings.timeout_secs),
            parallelism: settings.parallelism,
            filter: UrlFilter::new(&settings.excluded_urls)?,
            parser,
        })
    }

    /// Crawl from a seed URL until depth, deadline, and the link graph
    /// are exhausted, then snapshot the totals.
    pub async fn crawl(&self, seed: &str) -> CrawlResult {
        // The time budget becomes one absolute cutoff for every task
        let deadline = Instant::now() + self.timeout;
        let ledger = VisitLedger::new();
        let tally = WordTally::new();

        info!(
            "Crawling from {} (depth {}, {} workers, {:?} budget)",
            seed, self.max_depth, self.parallelism, self.timeout
        );

        let ctx = Arc::new(CrawlContext {
            deadline,
            ledger: ledger.clone(),
            tally: tally.clone(),
            filter: self.filter.clone(),
            parser: Arc::clone(&self.parser),
            workers: Arc::new(Semaphore::new(self.parallelism)),
        });

        CrawlTask::new(seed.to_string(), self.max_depth, ctx)
            .run()
            .await;

        let result = CrawlResult {
            word_counts: tally.snapshot(),
            urls_visited: ledger.len(),
        };

        info!(
            "Crawl finished: {} URLs, {} distinct words",
            result.urls_visited,
            result.word_counts.len()
        );

        result
    }
}
