//! Run coordinator - main orchestration logic
//!
//! The coordinator owns everything a run needs (configuration, fetcher,
//! extractor, throttle, URL set, report sink) and walks it through the
//! phases of [`RunPhase`]:
//!
//! ```text
//! Init -> ParserSelection -> Crawling -> UrlsOnly -> Done
//!                                     \-> Fetching -> Done
//! ```
//!
//! Any phase may end in `Failed`. The report sink is opened during `Init`,
//! so a stale report is truncated even when the crawl later fails. URL-only
//! runs never open it.

use crate::config::{validate, Config};
use crate::crawler::search::crawl_search_pages;
use crate::crawler::{Fetcher, Throttle};
use crate::extract::{select_backend, Extractor};
use crate::matcher::Matcher;
use crate::output::{log_summary, ReportSink, RunSummary};
use crate::state::RunPhase;
use crate::GrepError;
use std::collections::BTreeSet;
use std::time::Duration;

/// What a successful run produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// URL-only mode: the sorted listing URLs, nothing was fetched
    UrlsListed(Vec<String>),

    /// Every listing was processed
    Completed(RunSummary),
}

/// Main run coordinator structure
pub struct Coordinator {
    config: Config,
    phase: RunPhase,
    retry_backoff: Option<Duration>,
    sink: Option<ReportSink>,
}

impl Coordinator {
    /// Creates a coordinator in the `Init` phase
    pub fn new(config: Config) -> Self {
        Self {
            config,
            phase: RunPhase::Init,
            retry_backoff: None,
            sink: None,
        }
    }

    /// Overrides the fetcher's initial retry backoff
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = Some(backoff);
        self
    }

    /// Writes match records to `sink` instead of opening `config.output`
    pub fn with_sink(mut self, sink: ReportSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Current phase
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Runs to completion
    ///
    /// On error the coordinator is left in `Failed` and the error is
    /// returned unchanged.
    pub async fn run(&mut self) -> Result<RunOutcome, GrepError> {
        match self.drive().await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                if !self.phase.is_terminal() {
                    tracing::debug!("Run failed during {}: {}", self.phase, e);
                    self.phase = RunPhase::Failed;
                }
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<RunOutcome, GrepError> {
        // Init
        validate(&self.config)?;
        let matcher = Matcher::new(&self.config.pattern)?;
        let sink = self.open_sink()?;

        self.transition(RunPhase::ParserSelection)?;
        let extractor = select_backend(self.config.parser)?;
        tracing::info!("Using parser backend: {}", extractor.name());

        self.transition(RunPhase::Crawling)?;
        let mut fetcher = Fetcher::new(&self.config)?;
        if let Some(backoff) = self.retry_backoff {
            fetcher = fetcher.with_backoff(backoff);
        }
        let mut throttle = Throttle::new(self.config.delay_duration());

        let urls =
            crawl_search_pages(&self.config, &fetcher, extractor.as_ref(), &mut throttle).await?;
        tracing::info!(
            "Found {} distinct listing(s) across {} search page(s)",
            urls.len(),
            self.config.pages
        );

        let Some(mut sink) = sink else {
            self.transition(RunPhase::UrlsOnly)?;
            let listed: Vec<String> = urls.into_iter().collect();
            self.transition(RunPhase::Done)?;
            return Ok(RunOutcome::UrlsListed(listed));
        };

        self.transition(RunPhase::Fetching)?;

        let summary = self
            .fetch_listings(
                &urls,
                &fetcher,
                extractor.as_ref(),
                &matcher,
                &mut throttle,
                &mut sink,
            )
            .await?;

        self.transition(RunPhase::Done)?;
        log_summary(&summary);
        Ok(RunOutcome::Completed(summary))
    }

    /// Opens the report sink, or returns None in URL-only mode
    fn open_sink(&mut self) -> Result<Option<ReportSink>, GrepError> {
        if self.config.urls_only {
            return Ok(None);
        }
        if let Some(sink) = self.sink.take() {
            return Ok(Some(sink));
        }

        ReportSink::open(&self.config)
            .map(Some)
            .map_err(|source| GrepError::SinkUnavailable {
                path: self.config.output.clone(),
                source,
            })
    }

    /// Fetches, matches and reports every listing in set order
    async fn fetch_listings(
        &self,
        urls: &BTreeSet<String>,
        fetcher: &Fetcher,
        extractor: &dyn Extractor,
        matcher: &Matcher,
        throttle: &mut Throttle,
        sink: &mut ReportSink,
    ) -> Result<RunSummary, GrepError> {
        let mut summary = RunSummary {
            search_pages: self.config.pages,
            listings_found: urls.len(),
            ..RunSummary::default()
        };

        for (index, url) in urls.iter().enumerate() {
            throttle.wait_turn().await;

            let html = match fetcher.fetch(url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Skipping listing: {}", e);
                    summary.details_failed += 1;
                    continue;
                }
            };
            summary.details_fetched += 1;

            let post = extractor.extract_post(url, &html);
            if let Some(result) = matcher.match_post(&post) {
                tracing::debug!("Match in {}: {:?}", url, result.hits);
                sink.emit(&result)?;
                summary.matches += 1;
            }

            if (index + 1) % 25 == 0 {
                tracing::info!(
                    "Progress: {}/{} listings processed, {} match(es)",
                    index + 1,
                    urls.len(),
                    summary.matches
                );
            }
        }

        Ok(summary)
    }

    /// Moves to `next`, refusing transitions the phase graph does not allow
    fn transition(&mut self, next: RunPhase) -> Result<(), GrepError> {
        if !self.phase.can_transition_to(next) {
            return Err(GrepError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }

        tracing::debug!("Run phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }
}

/// Runs a complete search with the given configuration
pub async fn run(config: Config) -> Result<RunOutcome, GrepError> {
    Coordinator::new(config).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_coordinator_starts_in_init() {
        let coordinator = Coordinator::new(Config::default());
        assert_eq!(coordinator.phase(), RunPhase::Init);
    }

    #[test]
    fn test_transition_rejects_skipping_phases() {
        let mut coordinator = Coordinator::new(Config::default());
        let err = coordinator.transition(RunPhase::Fetching).unwrap_err();
        assert!(matches!(
            err,
            GrepError::InvalidTransition {
                from: RunPhase::Init,
                to: RunPhase::Fetching
            }
        ));
        assert_eq!(coordinator.phase(), RunPhase::Init);
    }

    #[test]
    fn test_transition_follows_phase_graph() {
        let mut coordinator = Coordinator::new(Config::default());
        coordinator.transition(RunPhase::ParserSelection).unwrap();
        coordinator.transition(RunPhase::Crawling).unwrap();
        coordinator.transition(RunPhase::UrlsOnly).unwrap();
        coordinator.transition(RunPhase::Done).unwrap();
        assert!(coordinator.transition(RunPhase::Failed).is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_network() {
        // Empty host and pattern never pass validation
        let mut coordinator = Coordinator::new(Config::default());
        let err = coordinator.run().await.unwrap_err();
        assert!(err.is_usage());
        assert_eq!(coordinator.phase(), RunPhase::Failed);
    }

    fn valid_config(output: String) -> Config {
        Config {
            scheme: "http".to_string(),
            host: "127.0.0.1:9".to_string(),
            pattern: "bike".to_string(),
            output,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_unopenable_report_fails_in_init() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("report.txt");
        let mut coordinator = Coordinator::new(valid_config(output.display().to_string()));

        let err = coordinator.run().await.unwrap_err();
        assert!(matches!(err, GrepError::SinkUnavailable { .. }));
        assert!(err.is_usage());
        assert_eq!(coordinator.phase(), RunPhase::Failed);
    }

    #[test]
    fn test_urls_only_never_opens_the_report() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("missing").join("report.txt");
        let mut config = valid_config(output.display().to_string());
        config.urls_only = true;

        let mut coordinator = Coordinator::new(config);
        assert!(coordinator.open_sink().unwrap().is_none());
    }
}
