//! Listing-Grep main entry point
//!
//! This is the command-line interface for the listings keyword search.

use clap::Parser;
use listing_grep::config::{compute_config_hash, read_config, validate, Config};
use listing_grep::{BackendChoice, ConfigError, GrepError, OutputFormat, RunOutcome};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for bad arguments, bad configuration or an empty crawl
const EXIT_USAGE: u8 = 2;

/// Exit code for failures while the run was in progress
const EXIT_RUNTIME: u8 = 1;

/// Listing-Grep: keyword search over a classifieds section
///
/// Crawls the search pages of one section, fetches every listing they link
/// to, and reports the listings whose title or body matches a
/// case-insensitive regular expression.
#[derive(Parser, Debug)]
#[command(name = "listing-grep")]
#[command(version)]
#[command(about = "Grep the listings of a classifieds section", long_about = None)]
struct Cli {
    /// Optional TOML configuration file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Site host, or a bare city name expanded to {city}.craigslist.org
    #[arg(long, value_name = "HOST")]
    city: Option<String>,

    /// URL scheme (http is only useful against local test servers)
    #[arg(long, value_name = "SCHEME", hide = true)]
    scheme: Option<String>,

    /// Section to search
    #[arg(long, value_name = "SECTION")]
    section: Option<String>,

    /// Number of search pages to crawl
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Result offset of the first search page
    #[arg(long, value_name = "N")]
    start: Option<u32>,

    /// Offset increment between search pages
    #[arg(long, value_name = "N")]
    step: Option<u32>,

    /// Sort key for the search pages
    #[arg(long, value_name = "KEY")]
    sort: Option<String>,

    /// Free-text query passed to the search pages
    #[arg(long, value_name = "QUERY")]
    query: Option<String>,

    /// Case-insensitive regular expression matched against title and body
    #[arg(long = "match", value_name = "REGEX")]
    pattern: Option<String>,

    /// Report destination, `-` for stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,

    /// Append to the report file instead of truncating it
    #[arg(long)]
    append: bool,

    /// Record format: plain, tsv or block
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Print the discovered listing URLs and exit without fetching them
    #[arg(long)]
    print_urls: bool,

    /// Seconds to pause between requests
    #[arg(long, value_name = "SECS")]
    delay: Option<f64>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Retries for a failed request
    #[arg(long, value_name = "N")]
    retries: Option<u32>,

    /// User-Agent header
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// HTML parser backend: auto, scraper, lol-html or kuchiki
    #[arg(long, value_name = "BACKEND")]
    parser: Option<String>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            setup_logging(cli.verbose);
            tracing::error!("{}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    setup_logging(config.verbose);
    if let Some(path) = &cli.config {
        match compute_config_hash(path) {
            Ok(hash) => tracing::info!(
                "Configuration loaded from {} (hash: {})",
                path.display(),
                hash
            ),
            Err(e) => tracing::debug!("Could not hash {}: {}", path.display(), e),
        }
    }

    tracing::info!(
        "Searching {}://{}/search/{} ({} page(s)) for /{}/",
        config.scheme,
        config.host,
        config.section,
        config.pages,
        config.pattern
    );

    match listing_grep::run(config).await {
        Ok(RunOutcome::UrlsListed(urls)) => {
            for url in &urls {
                println!("{}", url);
            }
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Completed(summary)) => {
            tracing::debug!("Completed with {} match(es)", summary.matches);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}

/// Maps a run error onto the process exit code
fn exit_code_for(error: &GrepError) -> u8 {
    if error.is_usage() {
        EXIT_USAGE
    } else {
        EXIT_RUNTIME
    }
}

/// Loads the optional config file, applies flag overrides, then validates
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => Config::default(),
    };

    apply_overrides(&mut config, cli)?;
    validate(&config)?;
    Ok(config)
}

/// Copies every flag that was given onto the configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<(), ConfigError> {
    if let Some(city) = &cli.city {
        config.host = expand_city(city);
    }
    if let Some(scheme) = &cli.scheme {
        config.scheme = scheme.clone();
    }
    if let Some(section) = &cli.section {
        config.section = section.clone();
    }
    if let Some(pages) = cli.pages {
        config.pages = pages;
    }
    if let Some(start) = cli.start {
        config.start = start;
    }
    if let Some(step) = cli.step {
        config.step = step;
    }
    if let Some(sort) = &cli.sort {
        config.sort = sort.clone();
    }
    if let Some(query) = &cli.query {
        config.query = Some(query.clone());
    }
    if let Some(pattern) = &cli.pattern {
        config.pattern = pattern.clone();
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if let Some(format) = &cli.format {
        config.format = format.parse::<OutputFormat>()?;
    }
    if let Some(delay) = cli.delay {
        config.delay = delay;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if let Some(retries) = cli.retries {
        config.retries = retries;
    }
    if let Some(user_agent) = &cli.user_agent {
        config.user_agent = user_agent.clone();
    }
    if let Some(parser) = &cli.parser {
        config.parser = parser.parse::<BackendChoice>()?;
    }

    config.append |= cli.append;
    config.urls_only |= cli.print_urls;
    config.verbose |= cli.verbose;
    Ok(())
}

/// `sfbay` -> `sfbay.craigslist.org`; anything with a dot is kept as is
fn expand_city(city: &str) -> String {
    let city = city.trim().to_ascii_lowercase();
    if city.contains('.') || city.contains(':') {
        city
    } else {
        format!("{}.craigslist.org", city)
    }
}

/// Sets up the logging/tracing subscriber
///
/// Logs go to stderr so that reports and URL listings on stdout stay
/// clean. `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: bool) {
    let default_filter = if verbose {
        "listing_grep=debug,info"
    } else {
        "listing_grep=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .try_init();
}
