//! Paginated job-listing crawler.
//!
//! Fetches listing pages one at a time, strips them down to content
//! markup, pulls `{jobId, searchRequestToken}` records out of attribute
//! values and merges them into a JSON file deduplicated by job id.

pub mod config;
pub mod crawlers;
pub mod error;
pub mod pagination;
pub mod parsers;
pub mod results;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{CrawlLimits, CrawlerConfig};
pub use crawlers::{Controller, CrawlState, Fetcher, HttpFetcher};
pub use error::{CrawlError, Result};
pub use results::{CrawlSummary, JobRecord, StopReason};
pub use store::RecordStore;

/// Crawl with the stock HTTP fetcher, wiping the record file first if `fresh` is set
pub async fn crawl(config: &CrawlerConfig, fresh: bool) -> Result<CrawlSummary> {
    config.validate()?;

    if fresh {
        RecordStore::new(&config.output_path).wipe()?;
    }

    let fetcher = HttpFetcher::from_config(config)?;
    let mut controller = Controller::new(config, fetcher)?;
    controller.run().await
}
