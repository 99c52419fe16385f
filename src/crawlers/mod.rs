pub mod controller;
pub mod fetch;

pub use controller::{Controller, CrawlState};
pub use fetch::{FetchResponse, Fetcher, HttpFetcher};
