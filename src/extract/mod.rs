//! HTML extraction backends
//!
//! Every backend implements [`Extractor`] and produces the same output for
//! the same document: raw text is gathered by the backend and normalized by
//! the shared [`text`] module. Which backends exist depends on the cargo
//! features the crate was built with.

#[cfg(feature = "backend-kuchiki")]
mod kuchiki_backend;
#[cfg(feature = "backend-lol-html")]
mod lol_html_backend;
#[cfg(feature = "backend-scraper")]
mod scraper_backend;
pub mod text;

#[cfg(feature = "backend-kuchiki")]
pub use kuchiki_backend::KuchikiExtractor;
#[cfg(feature = "backend-lol-html")]
pub use lol_html_backend::LolHtmlExtractor;
#[cfg(feature = "backend-scraper")]
pub use scraper_backend::ScraperExtractor;

use crate::config::BackendChoice;
use crate::matcher::Post;
use crate::ConfigError;

/// Order in which `auto` tries the compiled-in backends
pub const PREFERENCE_ORDER: [BackendChoice; 3] = [
    BackendChoice::Scraper,
    BackendChoice::LolHtml,
    BackendChoice::Kuchiki,
];

/// Capability interface shared by all extraction backends
pub trait Extractor: Send + Sync {
    /// Backend name as accepted by `--parser`
    fn name(&self) -> &'static str;

    /// Every anchor `href`, in document order, unfiltered
    fn extract_links(&self, html: &str) -> Vec<String>;

    /// Single-line listing title, empty if the page has none
    fn extract_title(&self, html: &str) -> String;

    /// Multi-line listing body, empty if the page has none
    fn extract_body(&self, html: &str) -> String;

    /// Builds a [`Post`] from a fetched detail page
    fn extract_post(&self, url: &str, html: &str) -> Post {
        Post {
            url: url.to_string(),
            title: self.extract_title(html),
            body: self.extract_body(html),
        }
    }
}

/// Returns true if the given backend was compiled into this build
pub fn is_available(choice: BackendChoice) -> bool {
    match choice {
        BackendChoice::Auto => PREFERENCE_ORDER.iter().any(|c| is_available(*c)),
        BackendChoice::Scraper => cfg!(feature = "backend-scraper"),
        BackendChoice::LolHtml => cfg!(feature = "backend-lol-html"),
        BackendChoice::Kuchiki => cfg!(feature = "backend-kuchiki"),
    }
}

/// Lists the compiled-in backends in preference order
pub fn available_backends() -> Vec<BackendChoice> {
    PREFERENCE_ORDER
        .iter()
        .copied()
        .filter(|c| is_available(*c))
        .collect()
}

/// Resolves a backend choice to a concrete extractor
///
/// `Auto` takes the first available backend in [`PREFERENCE_ORDER`]. An
/// explicit choice that was not compiled in fails instead of falling back.
pub fn select_backend(choice: BackendChoice) -> Result<Box<dyn Extractor>, ConfigError> {
    let resolved = match choice {
        BackendChoice::Auto => available_backends()
            .into_iter()
            .next()
            .ok_or(ConfigError::BackendUnavailable("auto"))?,
        explicit => explicit,
    };

    let extractor = build(resolved).ok_or(ConfigError::BackendUnavailable(resolved.as_str()))?;
    tracing::debug!("Selected parser backend: {}", extractor.name());
    Ok(extractor)
}

fn build(choice: BackendChoice) -> Option<Box<dyn Extractor>> {
    match choice {
        #[cfg(feature = "backend-scraper")]
        BackendChoice::Scraper => Some(Box::new(ScraperExtractor::new())),
        #[cfg(feature = "backend-lol-html")]
        BackendChoice::LolHtml => Some(Box::new(LolHtmlExtractor::new())),
        #[cfg(feature = "backend-kuchiki")]
        BackendChoice::Kuchiki => Some(Box::new(KuchikiExtractor::new())),
        _ => None,
    }
}
