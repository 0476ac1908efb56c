use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Output path that selects standard output instead of a file
pub const STDOUT_SINK: &str = "-";

/// Main configuration structure for Listing-Grep
///
/// Built once at startup and passed by reference afterwards. Keys in the
/// TOML file use kebab-case (`user-agent`, `urls-only`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// URL scheme used to reach the site (`https` unless testing locally)
    pub scheme: String,

    /// Site host, e.g. `sfbay.craigslist.org`
    pub host: String,

    /// Section path segment, e.g. `sss`
    pub section: String,

    /// Number of search pages to crawl
    pub pages: u32,

    /// Offset of the first search page
    pub start: u32,

    /// Offset increment between consecutive search pages
    pub step: u32,

    /// Sort key passed to the search page
    pub sort: String,

    /// Optional free-text search query
    pub query: Option<String>,

    /// Case-insensitive regular expression applied to title and body
    pub pattern: String,

    /// Report destination; `-` means stdout
    pub output: String,

    /// Append to the report instead of truncating it
    pub append: bool,

    /// Report record format
    pub format: OutputFormat,

    /// Only list the discovered listing URLs, never fetch detail pages
    pub urls_only: bool,

    /// Courtesy pause after every request (seconds, fractional allowed)
    pub delay: f64,

    /// Per-attempt request timeout (seconds)
    pub timeout: u64,

    /// Additional attempts after a failed request
    pub retries: u32,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// HTML extraction backend
    pub parser: BackendChoice,

    /// Verbose logging
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: String::new(),
            section: "sss".to_string(),
            pages: 1,
            start: 0,
            step: 120,
            sort: "date".to_string(),
            query: None,
            pattern: String::new(),
            output: STDOUT_SINK.to_string(),
            append: false,
            format: OutputFormat::default(),
            urls_only: false,
            delay: 1.0,
            timeout: 20,
            retries: 2,
            user_agent: format!("listing-grep/{}", env!("CARGO_PKG_VERSION")),
            parser: BackendChoice::default(),
            verbose: false,
        }
    }
}

impl Config {
    /// The courtesy delay as a `Duration`
    pub fn delay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// The per-attempt timeout as a `Duration`
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Returns true if the report goes to stdout
    pub fn writes_to_stdout(&self) -> bool {
        self.output == STDOUT_SINK
    }
}

/// Report record format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum OutputFormat {
    /// `Match! (hit)(hit) URL - Title`
    #[default]
    Plain,
    /// Tab separated columns
    Tsv,
    /// Four-line block with a blank separator
    Block,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Tsv => "tsv",
            Self::Block => "block",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "tsv" => Ok(Self::Tsv),
            "block" => Ok(Self::Block),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which HTML extraction backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum BackendChoice {
    /// First available backend in preference order
    #[default]
    Auto,
    Scraper,
    LolHtml,
    Kuchiki,
}

impl BackendChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Scraper => "scraper",
            Self::LolHtml => "lol-html",
            Self::Kuchiki => "kuchiki",
        }
    }
}

impl FromStr for BackendChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "scraper" => Ok(Self::Scraper),
            "lol-html" | "lol_html" | "lolhtml" => Ok(Self::LolHtml),
            "kuchiki" => Ok(Self::Kuchiki),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl TryFrom<String> for BackendChoice {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for BackendChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
