//! Extraction backed by `scraper` (html5ever DOM + CSS selectors)

use crate::extract::text::{
    normalize_body, normalize_title, BODY_SELECTOR, LINK_SELECTOR, TITLE_SELECTOR,
};
use crate::extract::Extractor;
use scraper::{ElementRef, Html, Node, Selector};

/// DOM-based extractor, the default backend
#[derive(Debug, Default, Clone, Copy)]
pub struct ScraperExtractor;

impl ScraperExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ScraperExtractor {
    fn name(&self) -> &'static str {
        "scraper"
    }

    fn extract_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
            return Vec::new();
        };

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::to_string)
            .collect()
    }

    fn extract_title(&self, html: &str) -> String {
        first_raw_text(html, TITLE_SELECTOR)
            .map(|raw| normalize_title(&raw))
            .unwrap_or_default()
    }

    fn extract_body(&self, html: &str) -> String {
        first_raw_text(html, BODY_SELECTOR)
            .map(|raw| normalize_body(&raw))
            .unwrap_or_default()
    }
}

/// Raw text of the first element matching `css`, `None` if nothing matches
fn first_raw_text(html: &str, css: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next().map(raw_text)
}

/// Concatenates descendant text nodes, turning `<br>` into a line break
fn raw_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out
}
