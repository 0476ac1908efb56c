//! Extraction backed by `kuchiki` (html5ever DOM, manual tree walk)
//!
//! kuchiki keeps `<template>` contents in a separate fragment instead of
//! under the element. The walks below descend into that fragment so template
//! text and links are seen the same way the other backends see them.

use crate::extract::text::{
    normalize_body, normalize_title, BODY_SELECTOR, LINK_SELECTOR, TITLE_SELECTOR,
};
use crate::extract::Extractor;
use kuchiki::traits::TendrilSink;
use kuchiki::{ElementData, NodeDataRef, NodeRef, Selectors};

#[derive(Debug, Default, Clone, Copy)]
pub struct KuchikiExtractor;

impl KuchikiExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for KuchikiExtractor {
    fn name(&self) -> &'static str {
        "kuchiki"
    }

    fn extract_links(&self, html: &str) -> Vec<String> {
        let document = kuchiki::parse_html().one(html);
        let Ok(selectors) = Selectors::compile(LINK_SELECTOR) else {
            return Vec::new();
        };

        elements(&document)
            .into_iter()
            .filter(|element| selectors.matches(element))
            .filter_map(|anchor| {
                let attributes = anchor.attributes.borrow();
                attributes.get("href").map(str::to_string)
            })
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

fn first_raw_text(html: &str, css: &str) -> Option<String> {
    let document = kuchiki::parse_html().one(html);
    let selectors = Selectors::compile(css).ok()?;
    let element = elements(&document)
        .into_iter()
        .find(|element| selectors.matches(element))?;

    let mut out = String::new();
    collect_text(element.as_node(), &mut out);
    Some(out)
}

/// Every element under `root` in document order, template contents included
fn elements(root: &NodeRef) -> Vec<NodeDataRef<ElementData>> {
    let mut out = Vec::new();
    collect_elements(root, &mut out);
    out
}

fn collect_elements(node: &NodeRef, out: &mut Vec<NodeDataRef<ElementData>>) {
    for child in node.children() {
        if let Some(element) = child.clone().into_element_ref() {
            let contents = element.template_contents.clone();
            out.push(element);
            if let Some(contents) = contents {
                collect_elements(&contents, out);
            }
        }
        collect_elements(&child, out);
    }
}

/// Appends descendant text to `out`, turning `<br>` into a line break
fn collect_text(node: &NodeRef, out: &mut String) {
    if let Some(contents) = node.as_element().and_then(|e| e.template_contents.as_ref()) {
        collect_text(contents, out);
    }

    for child in node.children() {
        if let Some(text) = child.as_text() {
            out.push_str(&text.borrow());
            continue;
        }
        if let Some(element) = child.as_element() {
            if &*element.name.local == "br" {
                out.push('\n');
            }
        }
        collect_text(&child, out);
    }
}
