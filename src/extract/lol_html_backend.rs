//! Extraction backed by `lol_html` (streaming, no DOM)
//!
//! `lol_html` hands over raw source text and attribute values. Every text
//! node and attribute is decoded on its own through html5ever's tokenizer
//! (via `scraper`), so character references follow the same WHATWG rules
//! as the DOM-based backends.

use crate::extract::text::{
    normalize_body, normalize_title, BODY_SELECTOR, LINK_SELECTOR, TITLE_SELECTOR,
};
use crate::extract::Extractor;
use lol_html::html_content::{EndTag, TextType};
use lol_html::{doc_text, element, EndTagHandler, HtmlRewriter, Settings};
use scraper::{ElementRef, Html};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Default, Clone, Copy)]
pub struct LolHtmlExtractor;

impl LolHtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for LolHtmlExtractor {
    fn name(&self) -> &'static str {
        "lol-html"
    }

    fn extract_links(&self, html: &str) -> Vec<String> {
        let links = RefCell::new(Vec::new());

        let result = {
            let mut rewriter = HtmlRewriter::new(
                Settings {
                    element_content_handlers: vec![element!(LINK_SELECTOR, |el| {
                        if let Some(href) = el.get_attribute("href") {
                            links.borrow_mut().push(decode_attribute(&href));
                        }
                        Ok(())
                    })],
                    ..Settings::default()
                },
                |_: &[u8]| {},
            );
            rewriter.write(html.as_bytes()).and_then(|()| rewriter.end())
        };

        if let Err(e) = result {
            tracing::warn!("lol-html stopped while collecting links: {}", e);
        }
        links.into_inner()
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

/// Streams the document and keeps the text inside the first `css` match
///
/// The element handler opens a capture window that its end-tag handler
/// closes. Text chunks seen while the window is open are buffered until
/// their text node is complete, then decoded and appended.
fn first_raw_text(html: &str, css: &str) -> Option<String> {
    let captured = RefCell::new(String::new());
    let pending = RefCell::new(String::new());
    let inside = Rc::new(Cell::new(false));
    let matched = Cell::new(false);

    let result = {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!(css, |el| {
                        if matched.replace(true) {
                            return Ok(());
                        }
                        if let Some(handlers) = el.end_tag_handlers() {
                            inside.set(true);
                            let inside = Rc::clone(&inside);
                            let close: EndTagHandler<'static> =
                                Box::new(move |_end: &mut EndTag<'_>| {
                                    inside.set(false);
                                    Ok(())
                                });
                            handlers.push(close);
                        }
                        Ok(())
                    }),
                    element!("br", |_el| {
                        if inside.get() {
                            captured.borrow_mut().push('\n');
                        }
                        Ok(())
                    }),
                ],
                document_content_handlers: vec![doc_text!(|chunk| {
                    if inside.get() {
                        pending.borrow_mut().push_str(chunk.as_str());
                    }
                    if chunk.last_in_text_node() {
                        let raw = std::mem::take(&mut *pending.borrow_mut());
                        if !raw.is_empty() {
                            captured
                                .borrow_mut()
                                .push_str(&decode_text(&raw, chunk.text_type()));
                        }
                    }
                    Ok(())
                })],
                ..Settings::default()
            },
            |_: &[u8]| {},
        );
        rewriter.write(html.as_bytes()).and_then(|()| rewriter.end())
    };

    if let Err(e) = result {
        tracing::warn!("lol-html stopped while extracting {}: {}", css, e);
    }

    matched.get().then(|| captured.into_inner())
}

/// Decodes one complete text node
///
/// Only data and RCDATA text carry character references; script, style and
/// other raw text is kept verbatim.
fn decode_text(raw: &str, text_type: TextType) -> String {
    match text_type {
        TextType::Data | TextType::RCData => {
            let fragment = Html::parse_fragment(&raw.replace('<', "&lt;"));
            fragment.root_element().text().collect()
        }
        _ => raw.to_string(),
    }
}

/// Decodes a raw attribute value with attribute-value reference rules
fn decode_attribute(raw: &str) -> String {
    let fragment = Html::parse_fragment(&format!(
        r#"<a href="{}"></a>"#,
        raw.replace('"', "&quot;")
    ));

    fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .find_map(|anchor| anchor.value().attr("href").map(str::to_string))
        .unwrap_or_else(|| raw.to_string())
}
