//! Report record rendering

use crate::config::OutputFormat;
use crate::matcher::MatchResult;

/// Leading marker of every record
const MATCH_MARKER: &str = "Match!";

/// Renders the hits as `(hit1)(hit2)...`
pub fn format_hits(hits: &[String]) -> String {
    hits.iter().map(|hit| format!("({})", hit)).collect()
}

/// Renders one match as a newline-terminated record
///
/// | format | shape |
/// |--------|-------|
/// | plain  | `Match! (h1)(h2) URL - Title` (no ` - Title` if the title is empty) |
/// | tsv    | `Match!<TAB>(h1)(h2)<TAB>URL<TAB>Title` |
/// | block  | match line, `URL:   <url>`, `Title: <title>`, blank line |
pub fn format_record(result: &MatchResult, format: OutputFormat) -> String {
    let hits = format_hits(&result.hits);

    match format {
        OutputFormat::Plain => {
            if result.title.is_empty() {
                format!("{} {} {}\n", MATCH_MARKER, hits, result.url)
            } else {
                format!(
                    "{} {} {} - {}\n",
                    MATCH_MARKER, hits, result.url, result.title
                )
            }
        }
        OutputFormat::Tsv => format!(
            "{}\t{}\t{}\t{}\n",
            MATCH_MARKER, hits, result.url, result.title
        ),
        OutputFormat::Block => format!(
            "{} {}\nURL:   {}\nTitle: {}\n\n",
            MATCH_MARKER, hits, result.url, result.title
        ),
    }
}
