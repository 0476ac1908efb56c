//! Run statistics
//!
//! Counters collected while a run is in progress and logged when it ends.

/// Counters for one completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Search pages fetched successfully
    pub search_pages: u32,

    /// Distinct listing URLs discovered
    pub listings_found: usize,

    /// Detail pages fetched successfully
    pub details_fetched: usize,

    /// Detail pages skipped after exhausting retries
    pub details_failed: usize,

    /// Records written to the report
    pub matches: usize,
}

impl RunSummary {
    /// Share of discovered listings that were fetched, in percent
    pub fn fetch_success_rate(&self) -> f64 {
        let attempted = self.details_fetched + self.details_failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.details_fetched as f64 / attempted as f64) * 100.0
    }
}

/// Logs a run summary at info level
pub fn log_summary(summary: &RunSummary) {
    tracing::info!(
        "Run finished: {} search page(s), {} listing(s), {} fetched, {} failed, {} match(es)",
        summary.search_pages,
        summary.listings_found,
        summary.details_fetched,
        summary.details_failed,
        summary.matches
    );

    if summary.details_failed > 0 {
        tracing::warn!(
            "{} listing(s) could not be fetched ({:.1}% success)",
            summary.details_failed,
            summary.fetch_success_rate()
        );
    }
}
