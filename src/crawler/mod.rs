//! Crawler module for catalog searching and page extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a shared client
//! - Filtered catalog searches
//! - Detail page extraction into tag sets
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod search;

pub use coordinator::{merge_hits, Coordinator, CrawlReport};
pub use extractor::PageExtractor;
pub use fetcher::{build_http_client, fetch_document};
pub use search::{SearchClient, SearchHit};

use crate::config::Config;
use crate::output::{CrawlProgress, RecordSink};
use crate::HarvestError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and compile selectors
/// 2. Search every filter set concurrently
/// 3. Merge hits into unique detail pages
/// 4. Fetch and extract each page under the concurrency limit
/// 5. Stream one record per page to the sink
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `sink` - Destination for the header and records
/// * `progress` - Completed-page counter
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed successfully
/// * `Err(HarvestError)` - Crawl failed; output written so far is incomplete
pub async fn crawl(
    config: &Config,
    sink: &mut dyn RecordSink,
    progress: &CrawlProgress,
) -> Result<CrawlReport, HarvestError> {
    Coordinator::new(config)?.run(sink, progress).await
}
