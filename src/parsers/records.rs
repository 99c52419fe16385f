//! Job record extraction.
//!
//! The listing site embeds a JSON blob with `jobId` and `searchRequestToken`
//! in an attribute of each result card. The attribute's name has changed
//! over time, so elements are matched on attribute *values* only: any value
//! containing both markers is treated as a candidate and parsed as JSON.

use crate::error::{CrawlError, Result};
use crate::results::JobRecord;
use regex::{Regex, RegexBuilder};
use scraper::{Html, Selector};
use serde::Deserialize;
use std::fmt;

/// Marker for the job id field, matched case-insensitively
pub const DEFAULT_JOB_ID_MARKER: &str = "jobid";

/// Marker for the token field, matched case-insensitively
pub const DEFAULT_TOKEN_MARKER: &str = "token";

/// A candidate attribute value that could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractError {
    /// Element and attribute the value came from, e.g. `div[data-search-sol-meta]`
    pub attribute: String,
    pub reason: String,
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.attribute, self.reason)
    }
}

/// Records found on one page plus the candidates that failed to parse
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<JobRecord>,
    pub errors: Vec<ExtractError>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchMeta {
    job_id: JobIdValue,
    search_request_token: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobIdValue {
    Text(String),
    Number(u64),
}

impl JobIdValue {
    fn into_string(self) -> String {
        match self {
            JobIdValue::Text(s) => s.trim().to_string(),
            JobIdValue::Number(n) => n.to_string(),
        }
    }
}

/// Finds job records in attribute values carrying both markers
#[derive(Debug, Clone)]
pub struct RecordExtractor {
    job_id_marker: Regex,
    token_marker: Regex,
}

impl Default for RecordExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_JOB_ID_MARKER, DEFAULT_TOKEN_MARKER)
            .expect("Default markers should be valid")
    }
}

impl RecordExtractor {
    /// Create an extractor for the given markers
    pub fn new(job_id_marker: &str, token_marker: &str) -> Result<Self> {
        Ok(Self {
            job_id_marker: marker_regex(job_id_marker)?,
            token_marker: marker_regex(token_marker)?,
        })
    }

    /// Whether an attribute value carries both markers
    pub fn is_candidate(&self, value: &str) -> bool {
        self.job_id_marker.is_match(value) && self.token_marker.is_match(value)
    }

    /// Collect up to `max_records` records in document order.
    ///
    /// Scanning stops as soon as the limit is hit. An empty result is not
    /// an error; it means the page has no more listings.
    pub fn extract(&self, document: &Html, max_records: usize) -> Extraction {
        let mut extraction = Extraction::default();
        if max_records == 0 {
            return extraction;
        }

        let all = Selector::parse("*").unwrap();
        for element in document.select(&all) {
            let el = element.value();
            for (name, value) in el.attrs() {
                if !self.is_candidate(value) {
                    continue;
                }

                match parse_record(value) {
                    Ok(record) => {
                        ::log::trace!("Extracted job {}", record.job_id);
                        extraction.records.push(record);
                        if extraction.records.len() >= max_records {
                            ::log::debug!("Reached {} records, stopping scan", max_records);
                            return extraction;
                        }
                    }
                    Err(reason) => {
                        let error = ExtractError {
                            attribute: format!("{}[{}]", el.name(), name),
                            reason,
                        };
                        ::log::warn!("Skipping candidate {}", error);
                        extraction.errors.push(error);
                    }
                }
            }
        }

        extraction
    }
}

fn marker_regex(marker: &str) -> Result<Regex> {
    RegexBuilder::new(&regex::escape(marker))
        .case_insensitive(true)
        .build()
        .map_err(|e| CrawlError::Config(format!("invalid marker {:?}: {}", marker, e)))
}

fn parse_record(value: &str) -> std::result::Result<JobRecord, String> {
    let meta: SearchMeta =
        serde_json::from_str(value).map_err(|e| format!("invalid job metadata: {}", e))?;

    let job_id = meta.job_id.into_string();
    if job_id.is_empty() {
        return Err("empty jobId".to_string());
    }

    Ok(JobRecord::new(job_id, &meta.search_request_token))
}
