//! Append-only report sink
//!
//! Records are written and flushed one at a time, so an interrupted run
//! leaves every record it produced so far, and never half of one.

use crate::config::{Config, OutputFormat};
use crate::matcher::MatchResult;
use crate::output::format::format_record;
use std::fs::OpenOptions;
use std::io::{self, Write};

/// Destination for report records
pub struct ReportSink {
    writer: Box<dyn Write + Send>,
    format: OutputFormat,
    records: usize,
}

impl ReportSink {
    /// Opens the sink described by the configuration
    ///
    /// `-` selects stdout. A file is created if missing, then truncated or
    /// appended to depending on `config.append`.
    pub fn open(config: &Config) -> io::Result<Self> {
        if config.writes_to_stdout() {
            return Ok(Self::from_writer(io::stdout(), config.format));
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if config.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        let file = options.open(&config.output)?;
        tracing::debug!(
            "Report sink opened: {} ({})",
            config.output,
            if config.append { "append" } else { "truncate" }
        );
        Ok(Self::from_writer(file, config.format))
    }

    /// Wraps an arbitrary writer
    pub fn from_writer<W: Write + Send + 'static>(writer: W, format: OutputFormat) -> Self {
        Self {
            writer: Box::new(writer),
            format,
            records: 0,
        }
    }

    /// Writes one record and flushes it
    pub fn emit(&mut self, result: &MatchResult) -> io::Result<()> {
        let record = format_record(result, self.format);
        self.writer.write_all(record.as_bytes())?;
        self.writer.flush()?;
        self.records += 1;
        Ok(())
    }

    /// Number of records written through this sink
    pub fn records_written(&self) -> usize {
        self.records
    }
}
