use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::crawler::filter::UrlFilter;
use crate::crawler::ledger::VisitLedger;
use crate::crawler::tally::WordTally;
use crate::parser::PageParser;

/// State shared by every task of one crawl
///
/// Created by the engine immediately before the root task starts and
/// dropped when the last descendant finishes. The ledger and tally are
/// the only mutable members; tasks reach them solely through their
/// atomic operations.
pub struct CrawlContext {
    /// Absolute cutoff shared by all tasks, re-checked as each task begins
    pub deadline: Instant,

    /// Ledger enforcing at-most-once claiming of URLs
    pub ledger: VisitLedger,

    /// Running word totals across all processed pages
    pub tally: WordTally,

    /// Exclusion filter consulted before a URL may be claimed
    pub filter: UrlFilter,

    /// Collaborator turning a URL into links and word counts
    pub parser: Arc<dyn PageParser>,

    /// Worker pool: one permit per task in its processing phase
    pub workers: Arc<Semaphore>,
}

/// One unit of traversal work: a single URL at a given remaining depth
///
/// A task decides whether its URL should be processed at all, processes
/// it, and then forks one child task per outbound link with the depth
/// decremented. It is not finished until every descendant is finished.
pub struct CrawlTask {
    /// URL this task is responsible for
    url: String,

    /// Remaining depth; a task at depth 0 does not process its URL
    depth: u32,

    /// Shared crawl state, never copied per task
    ctx: Arc<CrawlContext>,
}

impl CrawlTask {
    /// Create the root task of a crawl
    pub fn new(url: String, depth: u32, ctx: Arc<CrawlContext>) -> Self {
        Self { url, depth, ctx }
    }

    /// Fork a task for one outbound link of this task's page
    fn child(&self, url: String) -> Self {
        Self {
            url,
            depth: self.depth - 1,
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Run this task and all of its descendants to completion.
    ///
    /// The checks run in a fixed order: depth and deadline first, then
    /// the exclusion filter, then the ledger claim. A task that skips at
    /// any of those steps leaves no trace in the ledger or the tally.
    /// Boxed because the traversal recurses through an async call.
    pub fn run(self) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            // Pool slot for the processing phase; the pool is never closed
            let permit = match Arc::clone(&self.ctx.workers).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };

            if self.depth == 0 || Instant::now() >= self.ctx.deadline {
                debug!("Skipping {} (depth or deadline exhausted)", self.url);
                return;
            }

            if self.ctx.filter.is_excluded(&self.url) {
                debug!("Skipping excluded URL: {}", self.url);
                return;
            }

            if !self.ctx.ledger.claim(&self.url) {
                debug!("Skipping already claimed URL: {}", self.url);
                return;
            }

            let page = match self.ctx.parser.parse(&self.url).await {
                Ok(page) => page,
                Err(e) => {
                    // A bad page costs only itself; the rest of the
                    // crawl continues
                    warn!("Failed to parse {}: {}", self.url, e);
                    return;
                }
            };

            self.ctx.tally.merge(page.word_counts);

            // A parent waiting on its children does not hold a pool slot
            drop(permit);

            let mut children = JoinSet::new();
            for link in page.links {
                children.spawn(self.child(link).run());
            }

            // Children re-check depth and deadline themselves
            while let Some(joined) = children.join_next().await {
                if let Err(e) = joined {
                    warn!("Crawl branch below {} aborted: {}", self.url, e);
                }
            }
        })
    }
}
