//! Output module for match reports
//!
//! This module handles:
//! - Rendering a match in the plain, tsv or block format
//! - Writing records incrementally to a file or stdout
//! - Summarizing a finished run

mod format;
mod sink;
pub mod stats;

pub use format::{format_hits, format_record};
pub use sink::ReportSink;
pub use stats::{log_summary, RunSummary};
