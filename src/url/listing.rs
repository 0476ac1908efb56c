use crate::url::normalize_url;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Schemes that can never lead to a listing
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Decides which hrefs on a search page point at listing detail pages
///
/// A detail page lives under `/{section}/` and is either
/// `/{section}/d/{slug}/{id}.html` or `/{section}/{id}.html` with a numeric
/// id. Relative hrefs are resolved against the site base.
#[derive(Debug, Clone)]
pub struct ListingFilter {
    base: Url,
    path_shape: Regex,
}

impl ListingFilter {
    /// Builds a filter for `section` on `{scheme}://{host}/`
    pub fn new(scheme: &str, host: &str, section: &str) -> Result<Self, ConfigError> {
        let base = Url::parse(&format!("{}://{}/", scheme, host))
            .map_err(|e| ConfigError::Validation(format!("Invalid host '{}': {}", host, e)))?;

        let path_shape = Regex::new(&format!(
            r"^/{}/(?:d/[^/]+/)?[0-9]+\.html$",
            regex::escape(section)
        ))
        .map_err(|e| ConfigError::Validation(format!("Invalid section '{}': {}", section, e)))?;

        Ok(Self { base, path_shape })
    }

    /// Resolves an href to an absolute http(s) URL
    ///
    /// Returns None for empty and fragment-only hrefs, for
    /// javascript:/mailto:/tel:/data: links, and for anything that does not
    /// end up as http or https.
    pub fn resolve(&self, href: &str) -> Option<Url> {
        let href = href.trim();

        if href.is_empty() || href.starts_with('#') {
            return None;
        }

        let lower = href.to_ascii_lowercase();
        if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
            return None;
        }

        let absolute = self.base.join(href).ok()?;
        matches!(absolute.scheme(), "http" | "https").then_some(absolute)
    }

    /// Turns an href into a normalized listing URL, or None if it is not one
    pub fn listing_url(&self, href: &str) -> Option<String> {
        let absolute = self.resolve(href)?;
        let normalized = normalize_url(absolute.as_str()).ok()?;

        if self.path_shape.is_match(normalized.path()) {
            Some(normalized.to_string())
        } else {
            None
        }
    }
}
