use clap::Parser;
use job_crawl::CrawlerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "job-crawl")]
#[command(about = "Collects job IDs from a paginated job listing site")]
#[command(version)]
pub struct Args {
    /// JSON configuration file; command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listing URL to start from
    #[arg(short, long)]
    pub start_url: Option<String>,

    /// Highest page number to fetch
    #[arg(short = 'p', long)]
    pub max_pages: Option<u32>,

    /// Maximum job records taken from each page
    #[arg(short = 'n', long)]
    pub max_records_per_page: Option<usize>,

    /// Record file to merge job IDs into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// File the cleaned HTML of the latest page is written to
    #[arg(long, conflicts_with = "no_snapshot")]
    pub snapshot: Option<PathBuf>,

    /// Do not write a cleaned page snapshot
    #[arg(long)]
    pub no_snapshot: bool,

    /// Pause in milliseconds between finishing a page and requesting the next
    #[arg(long)]
    pub page_delay_ms: Option<u64>,

    /// Delete the record file before crawling
    #[arg(long)]
    pub fresh: bool,
}

impl Args {
    /// Build the crawl configuration from the file (if any) and flags
    pub fn to_config(&self) -> job_crawl::Result<CrawlerConfig> {
        let mut config = match &self.config {
            Some(path) => CrawlerConfig::from_file(path)?,
            None => CrawlerConfig::default(),
        };

        if let Some(url) = &self.start_url {
            config.start_url = url.clone();
        }
        if let Some(max_pages) = self.max_pages {
            config.max_pages = max_pages;
        }
        if let Some(max_records) = self.max_records_per_page {
            config.max_records_per_page = max_records;
        }
        if let Some(output) = &self.output {
            config.output_path = output.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            config.snapshot_path = Some(snapshot.clone());
        }
        if self.no_snapshot {
            config.snapshot_path = None;
        }
        if let Some(delay) = self.page_delay_ms {
            config.page_delay_ms = delay;
        }

        Ok(config)
    }
}
