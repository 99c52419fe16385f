use serde::{Deserialize, Serialize};
use std::fmt;

/// A single job listing identified on a results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Site-assigned identifier, used as the dedup key
    #[serde(rename = "jobId")]
    pub job_id: String,

    /// Search request token with hyphens removed
    #[serde(rename = "searchRequestToken")]
    pub search_request_token: String,
}

impl JobRecord {
    /// Create a record, normalizing the token by dropping every `-`
    pub fn new(job_id: impl Into<String>, search_request_token: &str) -> Self {
        Self {
            job_id: job_id.into(),
            search_request_token: search_request_token.replace('-', ""),
        }
    }
}

/// Why a crawl stopped. Both are normal terminations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The last fetched page was at or beyond `max_pages`
    MaxPagesReached,
    /// The last fetched page produced no records
    NoRecords,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::MaxPagesReached => write!(f, "page limit reached"),
            StopReason::NoRecords => write!(f, "no records on page"),
        }
    }
}

/// Totals reported once a crawl has stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_fetched: u32,
    pub records_extracted: usize,
    /// Records that were new to the store
    pub records_added: usize,
    /// Size of the store after the last merge
    pub total_records: usize,
    pub stop_reason: StopReason,
}
