use crate::config::{CrawlLimits, CrawlerConfig};
use crate::crawlers::fetch::Fetcher;
use crate::error::Result;
use crate::pagination::{PageState, next_page_url};
use crate::parsers::{self, records::RecordExtractor};
use crate::results::{CrawlSummary, JobRecord, StopReason};
use crate::store::RecordStore;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Where the controller is in the fetch → extract → decide cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Fetching(Url),
    Extracting { url: Url, body: String },
    Deciding { url: Url, records: Vec<JobRecord> },
    Stopped(StopReason),
}

/// Drives a sequential crawl over the listing pages.
///
/// One page is in flight at a time. A page's records are merged into the
/// store before the next request is made, so stopping between pages always
/// leaves the store complete up to the last processed page.
pub struct Controller<F: Fetcher> {
    fetcher: F,
    store: RecordStore,
    extractor: RecordExtractor,
    limits: CrawlLimits,
    start_url: Url,
    snapshot_path: Option<PathBuf>,
    page_delay: Duration,
    state: CrawlState,
    pages_fetched: u32,
    records_extracted: usize,
    records_added: usize,
    total_records: usize,
}

impl<F: Fetcher> Controller<F> {
    /// Build a controller from a validated configuration
    pub fn new(config: &CrawlerConfig, fetcher: F) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            fetcher,
            store: RecordStore::new(&config.output_path),
            extractor: RecordExtractor::new(&config.job_id_marker, &config.token_marker)?,
            limits: config.limits()?,
            start_url: config.start_url()?,
            snapshot_path: config.snapshot_path.clone(),
            page_delay: config.page_delay(),
            state: CrawlState::Idle,
            pages_fetched: 0,
            records_extracted: 0,
            records_added: 0,
            total_records: 0,
        })
    }

    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Run until the crawl stops, returning what was done.
    ///
    /// Fetch failures end the run with an error; pages already processed
    /// stay in the store.
    pub async fn run(&mut self) -> Result<CrawlSummary> {
        ::log::info!(
            "Starting crawl at {} (max {} pages, {} records per page)",
            self.start_url,
            self.limits.max_pages(),
            self.limits.max_records_per_page()
        );

        loop {
            if let CrawlState::Stopped(reason) = self.state {
                let summary = CrawlSummary {
                    pages_fetched: self.pages_fetched,
                    records_extracted: self.records_extracted,
                    records_added: self.records_added,
                    total_records: self.total_records,
                    stop_reason: reason,
                };
                ::log::info!(
                    "Crawl stopped ({}): {} pages, {} records extracted, {} new, {} stored",
                    reason,
                    summary.pages_fetched,
                    summary.records_extracted,
                    summary.records_added,
                    summary.total_records
                );
                return Ok(summary);
            }
            self.step().await?;
        }
    }

    /// Advance the state machine by one transition.
    ///
    /// A failed fetch or store write leaves the controller in the state it
    /// failed from, so a later `step` retries that same transition.
    pub async fn step(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, CrawlState::Idle);
        let next = match state {
            CrawlState::Idle => CrawlState::Fetching(self.start_url.clone()),
            CrawlState::Fetching(url) => match self.fetch(&url).await {
                Ok(next) => next,
                Err(e) => {
                    self.state = CrawlState::Fetching(url);
                    return Err(e);
                }
            },
            CrawlState::Extracting { url, body } => self.extract(url, &body),
            CrawlState::Deciding { url, records } => match self.decide(&url, &records).await {
                Ok(next) => next,
                Err(e) => {
                    self.state = CrawlState::Deciding { url, records };
                    return Err(e);
                }
            },
            CrawlState::Stopped(reason) => CrawlState::Stopped(reason),
        };
        ::log::trace!("Crawl state -> {}", state_name(&next));
        self.state = next;
        Ok(())
    }

    async fn fetch(&mut self, url: &Url) -> Result<CrawlState> {
        let page = PageState::from_url(url);
        ::log::info!("Fetching page {}: {}", page.page_number, url);

        let response = self.fetcher.fetch(url).await?;
        self.pages_fetched += 1;

        Ok(CrawlState::Extracting {
            url: page.url,
            body: response.body,
        })
    }

    fn extract(&mut self, url: Url, body: &str) -> CrawlState {
        let parsed =
            parsers::parse_page(body, &self.extractor, self.limits.max_records_per_page());

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = std::fs::write(path, &parsed.cleaned_html) {
                ::log::warn!("Failed to write page snapshot {}: {}", path.display(), e);
            }
        }

        let records = parsed.extraction.records;
        ::log::debug!(
            "Extracted job IDs: {:?}",
            records.iter().map(|r| r.job_id.as_str()).collect::<Vec<_>>()
        );
        self.records_extracted += records.len();

        CrawlState::Deciding { url, records }
    }

    async fn decide(&mut self, url: &Url, records: &[JobRecord]) -> Result<CrawlState> {
        if records.is_empty() {
            ::log::info!("No job IDs found on {}, ending the crawl", url);
            return Ok(CrawlState::Stopped(StopReason::NoRecords));
        }

        let outcome = self.store.merge_and_save(records)?;
        self.records_added += outcome.added;
        self.total_records = outcome.total;
        ::log::info!(
            "Stored {} new of {} records ({} total in {})",
            outcome.added,
            records.len(),
            outcome.total,
            self.store.path().display()
        );

        let page = PageState::from_url(url);
        if page.page_number >= self.limits.max_pages() {
            ::log::info!(
                "Reached the maximum number of pages ({}), stopping",
                self.limits.max_pages()
            );
            return Ok(CrawlState::Stopped(StopReason::MaxPagesReached));
        }

        if !self.page_delay.is_zero() {
            tokio::time::sleep(self.page_delay).await;
        }
        Ok(CrawlState::Fetching(next_page_url(url)))
    }
}

fn state_name(state: &CrawlState) -> &'static str {
    match state {
        CrawlState::Idle => "idle",
        CrawlState::Fetching(_) => "fetching",
        CrawlState::Extracting { .. } => "extracting",
        CrawlState::Deciding { .. } => "deciding",
        CrawlState::Stopped(_) => "stopped",
    }
}
