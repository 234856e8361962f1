pub mod engine;
pub mod filter;
pub mod ledger;
pub mod tally;
pub mod task;

// Re-export common types
pub use engine::{CrawlEngine, CrawlResult};
pub use filter::UrlFilter;
pub use ledger::VisitLedger;
pub use tally::WordTally;
