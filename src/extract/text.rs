//! Shared text normalization for every extraction backend
//!
//! Backends only collect raw text: the concatenated text nodes of the target
//! element, with a `\n` for every `<br>`. Everything that shapes the final
//! string happens here, so two backends fed the same document agree.

/// Anchors whose `href` values are collected
pub const LINK_SELECTOR: &str = "a[href]";

/// Element holding the listing title
pub const TITLE_SELECTOR: &str = "#titletextonly";

/// Element holding the listing body
pub const BODY_SELECTOR: &str = "#postingbody";

/// Footer line rendered inside every listing body
pub const QR_BOILERPLATE: &str = "QR Code Link to This Post";

/// Collapses all whitespace runs to one space and trims the ends
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalizes raw title text to a single line
pub fn normalize_title(raw: &str) -> String {
    collapse_whitespace(raw)
}

/// Normalizes raw body text
///
/// Lines are split on `\n` or `\r`, each is whitespace-collapsed, and blank
/// lines and the QR footer are dropped.
pub fn normalize_body(raw: &str) -> String {
    raw.split(['\n', '\r'])
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty() && !is_boilerplate(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_boilerplate(line: &str) -> bool {
    line.eq_ignore_ascii_case(QR_BOILERPLATE)
}
