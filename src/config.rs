use crate::error::{CrawlError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Page and per-page record limits for one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlLimits {
    max_pages: u32,
    max_records_per_page: usize,
}

impl CrawlLimits {
    /// Both limits must be at least 1
    pub fn new(max_pages: u32, max_records_per_page: usize) -> Result<Self> {
        if max_pages == 0 {
            return Err(CrawlError::Config("max_pages must be at least 1".into()));
        }
        if max_records_per_page == 0 {
            return Err(CrawlError::Config(
                "max_records_per_page must be at least 1".into(),
            ));
        }
        Ok(Self {
            max_pages,
            max_records_per_page,
        })
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    pub fn max_records_per_page(&self) -> usize {
        self.max_records_per_page
    }
}

/// Configuration for a job listing crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Listing URL the crawl starts from on every run
    #[serde(default = "default_start_url")]
    pub start_url: String,

    /// Highest page number to fetch
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum records taken from a single page
    #[serde(default = "default_max_records_per_page")]
    pub max_records_per_page: usize,

    /// JSON file holding every record seen so far
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    /// Where the cleaned HTML of the latest page is written, if anywhere
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: Option<PathBuf>,

    /// User agents rotated across requests
    #[serde(default = "default_user_agents")]
    pub user_agents: Vec<String>,

    /// Lower bound of the random delay before each request
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound of the random delay before each request
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Pause between finishing one page and requesting the next
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// Substring an attribute value must contain to carry a job id
    #[serde(default = "default_job_id_marker")]
    pub job_id_marker: String,

    /// Substring an attribute value must contain to carry a token
    #[serde(default = "default_token_marker")]
    pub token_marker: String,
}

fn default_start_url() -> String {
    "https://www.seek.co.nz/jobs-in-information-communication-technology?page=1".to_string()
}

fn default_max_pages() -> u32 {
    2
}

fn default_max_records_per_page() -> usize {
    30
}

fn default_output_path() -> PathBuf {
    PathBuf::from("job_ids.json")
}

fn default_snapshot_path() -> Option<PathBuf> {
    Some(PathBuf::from("cleaned_page.html"))
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
        "Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_min_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    3000
}

fn default_page_delay_ms() -> u64 {
    2000
}

fn default_job_id_marker() -> String {
    "jobid".to_string()
}

fn default_token_marker() -> String {
    "token".to_string()
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self::new(&default_start_url())
    }
}

impl CrawlerConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            max_pages: default_max_pages(),
            max_records_per_page: default_max_records_per_page(),
            output_path: default_output_path(),
            snapshot_path: default_snapshot_path(),
            user_agents: default_user_agents(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            page_delay_ms: default_page_delay_ms(),
            job_id_marker: default_job_id_marker(),
            token_marker: default_token_marker(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| CrawlError::io(path, e))?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| CrawlError::io(path, e))?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Check everything the crawl depends on before the first request
    pub fn validate(&self) -> Result<()> {
        self.start_url()?;
        self.limits()?;
        if self.min_delay_ms > self.max_delay_ms {
            return Err(CrawlError::Config(format!(
                "min_delay_ms ({}) is greater than max_delay_ms ({})",
                self.min_delay_ms, self.max_delay_ms
            )));
        }
        if self.job_id_marker.is_empty() || self.token_marker.is_empty() {
            return Err(CrawlError::Config("attribute markers must not be empty".into()));
        }
        Ok(())
    }

    pub fn start_url(&self) -> Result<Url> {
        let url = Url::parse(&self.start_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CrawlError::Config(format!(
                "start URL must be http or https, got {}",
                other
            ))),
        }
    }

    pub fn limits(&self) -> Result<CrawlLimits> {
        CrawlLimits::new(self.max_pages, self.max_records_per_page)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}
