//! Search-page crawling
//!
//! Walks the paginated search results of one section and gathers the
//! distinct detail-page URLs they link to.

use crate::config::Config;
use crate::crawler::{Fetcher, Throttle};
use crate::extract::Extractor;
use crate::url::ListingFilter;
use crate::GrepError;
use std::collections::BTreeSet;
use url::Url;

/// Result offsets for every requested page
pub fn page_offsets(start: u32, step: u32, pages: u32) -> Vec<u32> {
    (0..pages)
        .map(|i| start.saturating_add(i.saturating_mul(step)))
        .collect()
}

/// Builds the search URL for one result offset
pub fn search_page_url(config: &Config, offset: u32) -> Result<Url, GrepError> {
    let mut url = Url::parse(&format!(
        "{}://{}/search/{}",
        config.scheme, config.host, config.section
    ))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("s", &offset.to_string());
        pairs.append_pair("sort", &config.sort);
        if let Some(query) = config.query.as_deref() {
            pairs.append_pair("query", query);
        }
    }

    Ok(url)
}

/// Search URLs for every page of the run, in page order
pub fn search_page_urls(config: &Config) -> Result<Vec<Url>, GrepError> {
    page_offsets(config.start, config.step, config.pages)
        .into_iter()
        .map(|offset| search_page_url(config, offset))
        .collect()
}

/// Adds every qualifying link of a search page to `urls`
///
/// Returns how many of them were new.
pub fn collect_listing_urls(
    extractor: &dyn Extractor,
    filter: &ListingFilter,
    html: &str,
    urls: &mut BTreeSet<String>,
) -> usize {
    let before = urls.len();

    for href in extractor.extract_links(html) {
        if let Some(listing) = filter.listing_url(&href) {
            urls.insert(listing);
        }
    }

    urls.len() - before
}

/// Crawls every search page and returns the listing URL set
///
/// A search page that cannot be fetched stops the run. An empty set after
/// the last page is reported as [`GrepError::NoListingsFound`].
pub async fn crawl_search_pages(
    config: &Config,
    fetcher: &Fetcher,
    extractor: &dyn Extractor,
    throttle: &mut Throttle,
) -> Result<BTreeSet<String>, GrepError> {
    let filter = ListingFilter::new(&config.scheme, &config.host, &config.section)?;
    let mut urls = BTreeSet::new();

    for (index, page_url) in search_page_urls(config)?.into_iter().enumerate() {
        throttle.wait_turn().await;

        tracing::debug!("Fetching search page {}/{}: {}", index + 1, config.pages, page_url);
        let html = fetcher
            .fetch(page_url.as_str())
            .await
            .map_err(GrepError::SearchPageFailed)?;

        let added = collect_listing_urls(extractor, &filter, &html, &mut urls);
        tracing::info!(
            "Search page {}/{}: {} new listing(s), {} total",
            index + 1,
            config.pages,
            added,
            urls.len()
        );
    }

    if urls.is_empty() {
        return Err(GrepError::NoListingsFound {
            pages: config.pages,
        });
    }

    Ok(urls)
}
