//! Listing-Grep: keyword search over a paginated listings site
//!
//! This crate crawls the search pages of a classifieds section, collects the
//! detail-page URLs they link to, fetches every listing, and reports the ones
//! whose title or body matches a user-supplied pattern.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod matcher;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Listing-Grep operations
#[derive(Debug, Error)]
pub enum GrepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(
        "No listing URLs found across {pages} search page(s); \
         the page structure or the section/host settings are probably wrong"
    )]
    NoListingsFound { pages: u32 },

    #[error("Cannot open report '{path}': {source}")]
    SinkUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Search page unavailable: {0}")]
    SearchPageFailed(#[source] FetchFailed),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunPhase,
        to: state::RunPhase,
    },
}

impl GrepError {
    /// Returns true if the error points at a setup problem rather than a
    /// transient failure while the run was in progress.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::NoListingsFound { .. } | Self::SinkUnavailable { .. }
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid match pattern: {0}")]
    InvalidPattern(String),

    #[error("Unsupported output format '{0}' (expected plain, tsv or block)")]
    UnknownFormat(String),

    #[error("Unknown parser backend '{0}' (expected auto, scraper, lol-html or kuchiki)")]
    UnknownBackend(String),

    #[error("Parser backend '{0}' is not available in this build")]
    BackendUnavailable(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Why a single request could not produce a page body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchCause {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Transport(String),
}

impl FetchCause {
    /// Returns true if another attempt may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) | Self::Transport(_) => true,
            Self::Status(code) => *code == 429 || (500..600).contains(code),
            Self::Body(_) => false,
        }
    }
}

/// A request that failed after every retry was spent
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fetch failed for {url}: {cause}")]
pub struct FetchFailed {
    pub url: String,
    pub cause: FetchCause,
}

// Re-export commonly used types
pub use config::{BackendChoice, Config, OutputFormat};
pub use crawler::{run, Coordinator, RunOutcome};
pub use matcher::{MatchResult, Matcher, Post};
pub use output::{ReportSink, RunSummary};
pub use state::RunPhase;
pub use url::{normalize_url, ListingFilter};
