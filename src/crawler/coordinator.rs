//! Crawler coordinator - main crawl orchestration logic
//!
//! A run has three phases separated by hard barriers:
//! - Discovery: every filter set is searched concurrently; all must succeed
//! - Merge: hits are deduplicated by detail URL (last title wins)
//! - Fetch: detail pages are fetched by a bounded pool of tasks and each
//!   finished record is written to the sink from this coordinating task
//!
//! Any fatal error cancels the outstanding tasks and fails the run.

use crate::config::{validate, Config, FilterSet};
use crate::crawler::extractor::PageExtractor;
use crate::crawler::fetcher::{build_http_client, fetch_document};
use crate::crawler::search::{SearchClient, SearchHit};
use crate::output::{CrawlProgress, RecordSink};
use crate::record::WorkRecord;
use crate::state::{CrawlTask, TaskState};
use crate::HarvestError;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Log a progress line every this many records when no bar is drawn
const PROGRESS_LOG_INTERVAL: usize = 25;

type FetchOutcome = Result<(CrawlTask, WorkRecord), HarvestError>;

/// Counts describing a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Number of filter sets searched
    pub filter_sets: usize,

    /// Search hits across all filter sets, before deduplication
    pub hits: usize,

    /// Unique detail pages crawled
    pub tasks: usize,

    /// Records written to the sink
    pub emitted: usize,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    client: Client,
    search: Arc<SearchClient>,
    extractor: Arc<PageExtractor>,
    filter_sets: Vec<FilterSet>,
    max_concurrent_fetches: usize,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Validates the configuration, builds the shared HTTP client and
    /// compiles all selectors, so configuration problems surface before any
    /// request is made.
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        validate(config)?;

        let client = build_http_client(&config.user_agent, &config.crawler)?;
        let search = SearchClient::new(client.clone(), &config.catalog, &config.selectors)?;
        let extractor =
            PageExtractor::new(&config.selectors, config.extractor.pre_header_values)?;

        Ok(Self {
            client,
            search: Arc::new(search),
            extractor: Arc::new(extractor),
            filter_sets: config.filter_sets.clone(),
            max_concurrent_fetches: config.crawler.max_concurrent_fetches as usize,
        })
    }

    /// Runs a complete crawl, writing the header and one row per work
    ///
    /// Rows reach the sink in completion order. On error, rows already
    /// written stay in the sink but the run must be treated as incomplete.
    pub async fn run(
        &self,
        sink: &mut dyn RecordSink,
        progress: &CrawlProgress,
    ) -> Result<CrawlReport, HarvestError> {
        tracing::info!("Searching {} filter sets", self.filter_sets.len());
        let results = self.discover().await?;

        let hits: usize = results.iter().map(Vec::len).sum();
        let tasks = merge_hits(results);
        tracing::info!(
            "Discovery complete: {} hits, {} unique works",
            hits,
            tasks.len()
        );

        let mut report = CrawlReport {
            filter_sets: self.filter_sets.len(),
            hits,
            tasks: tasks.len(),
            emitted: 0,
        };

        sink.write_header()?;
        report.emitted = self.fetch_all(tasks, sink, progress).await?;
        sink.finish()?;

        Ok(report)
    }

    /// Searches every filter set concurrently
    ///
    /// Results are returned in filter-set order regardless of which search
    /// finished first. The first failure aborts the remaining searches.
    pub async fn discover(&self) -> Result<Vec<Vec<SearchHit>>, HarvestError> {
        let mut set = JoinSet::new();
        for (index, filter_set) in self.filter_sets.iter().cloned().enumerate() {
            let search = Arc::clone(&self.search);
            set.spawn(async move { (index, search.search(&filter_set).await) });
        }

        let mut results = vec![Vec::new(); self.filter_sets.len()];
        while let Some(joined) = set.join_next().await {
            let (index, outcome) = match joined {
                Ok(pair) => pair,
                Err(e) => {
                    set.abort_all();
                    return Err(e.into());
                }
            };

            match outcome {
                Ok(hits) => results[index] = hits,
                Err(e) => {
                    tracing::error!("Search '{}' failed: {}", self.filter_sets[index].name, e);
                    set.abort_all();
                    return Err(e);
                }
            }
        }

        Ok(results)
    }

    /// Fetches every task with at most `max_concurrent_fetches` in flight
    async fn fetch_all(
        &self,
        tasks: Vec<CrawlTask>,
        sink: &mut dyn RecordSink,
        progress: &CrawlProgress,
    ) -> Result<usize, HarvestError> {
        let total = tasks.len();
        progress.start(total as u64);

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_fetches));
        let mut set = JoinSet::new();
        for task in tasks {
            let client = self.client.clone();
            let extractor = Arc::clone(&self.extractor);
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                // The semaphore is never closed, so acquiring cannot fail
                let _permit = semaphore.acquire_owned().await.ok();
                retrieve(&client, &extractor, task).await
            });
        }

        match drain(&mut set, sink, progress, total).await {
            Ok(emitted) => {
                progress.finish();
                tracing::info!("Crawl complete: {} of {} works written", emitted, total);
                Ok(emitted)
            }
            Err(e) => {
                set.abort_all();
                progress.abandon();
                Err(e)
            }
        }
    }
}

/// Fetches and extracts one detail page
async fn retrieve(
    client: &Client,
    extractor: &PageExtractor,
    mut task: CrawlTask,
) -> FetchOutcome {
    task.advance(TaskState::Fetching)?;

    let body = match fetch_document(client, &task.url).await {
        Ok(body) => body,
        Err(e) => {
            task.advance(TaskState::Failed)?;
            tracing::warn!("Failed to fetch '{}': {}", task.title, e);
            return Err(e);
        }
    };

    let details = extractor.extract(&body);
    task.advance(TaskState::Parsed)?;

    let record = WorkRecord::new(task.title.clone(), details);
    Ok((task, record))
}

/// Writes finished records in completion order until the set is empty
///
/// This is the only place the sink is written during the fetch phase, so
/// writes are serialized without a lock.
async fn drain(
    set: &mut JoinSet<FetchOutcome>,
    sink: &mut dyn RecordSink,
    progress: &CrawlProgress,
    total: usize,
) -> Result<usize, HarvestError> {
    let mut emitted = 0;

    while let Some(joined) = set.join_next().await {
        let (mut task, record) = joined??;

        sink.write_record(&record)?;
        task.advance(TaskState::Emitted)?;
        emitted += 1;
        progress.advance();

        if progress.is_hidden() && emitted % PROGRESS_LOG_INTERVAL == 0 {
            tracing::info!("Progress: {}/{} works", emitted, total);
        }
    }

    Ok(emitted)
}

/// Merges search hits into a deduplicated task list
///
/// Hits are taken in the given order. A URL seen again keeps its first
/// position but takes the newer title, so the last filter set to report a
/// work decides its title.
pub fn merge_hits<I>(results: I) -> Vec<CrawlTask>
where
    I: IntoIterator<Item = Vec<SearchHit>>,
{
    let mut positions: HashMap<Url, usize> = HashMap::new();
    let mut tasks: Vec<CrawlTask> = Vec::new();

    for hit in results.into_iter().flatten() {
        match positions.get(&hit.url) {
            Some(&index) => tasks[index].title = hit.title,
            None => {
                positions.insert(hit.url.clone(), tasks.len());
                tasks.push(CrawlTask::new(hit.title, hit.url));
            }
        }
    }

    tasks
}
