//! Crawler module for page fetching and run orchestration
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Courtesy delay between requests
//! - Search-page pagination and listing URL collection
//! - Overall run coordination

mod coordinator;
mod fetcher;
mod search;
mod throttle;

pub use coordinator::{run, Coordinator, RunOutcome};
pub use fetcher::{build_http_client, Fetcher, DEFAULT_RETRY_BACKOFF};
pub use search::{
    collect_listing_urls, crawl_search_pages, page_offsets, search_page_url, search_page_urls,
};
pub use throttle::Throttle;
