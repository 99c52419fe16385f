pub mod html;
pub mod records;

#[cfg(test)]
mod tests;

use crate::results::JobRecord;
use html::CleanedPage;
use records::{Extraction, RecordExtractor};

/// Result of running one fetched page through cleaning and extraction
#[derive(Debug)]
pub struct ParsedPage {
    /// Cleaned markup, kept for the debug snapshot
    pub cleaned_html: String,
    pub extraction: Extraction,
}

impl ParsedPage {
    pub fn records(&self) -> &[JobRecord] {
        &self.extraction.records
    }
}

/// Clean a raw page body and extract its job records
pub fn parse_page(body: &str, extractor: &RecordExtractor, max_records: usize) -> ParsedPage {
    let CleanedPage { html, document } = html::clean(body);
    let extraction = extractor.extract(&document, max_records);

    if !extraction.errors.is_empty() {
        ::log::debug!(
            "{} candidate attributes could not be parsed",
            extraction.errors.len()
        );
    }

    ParsedPage {
        cleaned_html: html,
        extraction,
    }
}
