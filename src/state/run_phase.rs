/// Run phase definitions for the orchestrator
///
/// A run moves forward through these phases exactly once. `Failed` can be
/// entered from any phase that is not already terminal.
use std::fmt;

/// The phase a run is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    // ===== Setup =====
    /// Configuration is being validated
    Init,

    /// The extraction backend is being resolved
    ParserSelection,

    // ===== Work =====
    /// Search pages are being crawled for listing URLs
    Crawling,

    /// URL-only mode: the URL set is being handed back without fetching
    UrlsOnly,

    /// Detail pages are being fetched, matched and reported
    Fetching,

    // ===== Terminal =====
    /// The run finished successfully
    Done,

    /// The run stopped on an error
    Failed,
}

impl RunPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        if self.is_terminal() {
            return false;
        }

        match (self, next) {
            (_, Self::Failed) => true,
            (Self::Init, Self::ParserSelection) => true,
            (Self::ParserSelection, Self::Crawling) => true,
            (Self::Crawling, Self::UrlsOnly | Self::Fetching) => true,
            (Self::UrlsOnly | Self::Fetching, Self::Done) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::ParserSelection => "parser_selection",
            Self::Crawling => "crawling",
            Self::UrlsOnly => "urls_only",
            Self::Fetching => "fetching",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible run phases
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Init,
            Self::ParserSelection,
            Self::Crawling,
            Self::UrlsOnly,
            Self::Fetching,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
