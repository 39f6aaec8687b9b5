//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use logiq_core::{IngestReport, LogLevel, Page, StoredRecord, Summary};
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

const ANSI_RESET: &str = "\u{1b}[0m";
const ANSI_GREEN: &str = "\u{1b}[32m";
const ANSI_YELLOW: &str = "\u{1b}[33m";
const ANSI_RED: &str = "\u{1b}[31m";

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormat {
    format: Format,
    color: bool,
}

impl OutputFormat {
    /// Create a new output formatter with coloured levels.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format, color: true }
    }

    /// Enable or disable ANSI colours in table output.
    #[must_use]
    pub const fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Whether table output colours levels.
    #[must_use]
    pub const fn color(&self) -> bool {
        self.color
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer, self.color)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as human-readable text; `color` enables ANSI levels.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W, color: bool) -> Result<(), CliError>;
}

/// Renders a level, coloured when requested.
#[must_use]
pub fn level_label(level: LogLevel, color: bool) -> String {
    if !color {
        return level.as_str().to_string();
    }
    let code = match level {
        LogLevel::Info => ANSI_GREEN,
        LogLevel::Warn => ANSI_YELLOW,
        LogLevel::Error => ANSI_RED,
    };
    format!("{code}{}{ANSI_RESET}", level.as_str())
}

/// Writes one stored record as a single row.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_row<W: Write>(writer: &mut W, stored: &StoredRecord, color: bool) -> Result<(), CliError> {
    let record = &stored.record;
    writeln!(
        writer,
        "ID: {} | Time: {} | Level: {} | Msg: {} | RootCause: {}",
        stored.id,
        record.timestamp,
        level_label(record.level, color),
        record.message,
        record.root_cause.map_or("N/A", |c| c.as_str())
    )?;
    Ok(())
}

/// A titled page of query results.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// Describes the query, e.g. `Logs with level = ERROR`.
    pub title: String,
    /// Zero-based page number.
    pub page_number: u64,
    /// The rows.
    #[serde(flatten)]
    pub page: Page,
}

impl Listing {
    /// Wraps a page under a title.
    #[must_use]
    pub fn new(title: impl Into<String>, page: Page) -> Self {
        let limit = page.request.limit();
        let page_number = if limit == 0 { 0 } else { page.request.offset() / limit };
        Self {
            title: title.into(),
            page_number,
            page,
        }
    }
}

impl TableDisplay for Listing {
    fn write_table<W: Write>(&self, writer: &mut W, color: bool) -> Result<(), CliError> {
        if self.page.is_empty() {
            writeln!(writer, "No logs found.")?;
            return Ok(());
        }
        writeln!(writer, "{} (page {}):", self.title, self.page_number + 1)?;
        for stored in &self.page.records {
            write_row(writer, stored, color)?;
        }
        Ok(())
    }
}

impl TableDisplay for Summary {
    fn write_table<W: Write>(&self, writer: &mut W, _color: bool) -> Result<(), CliError> {
        writeln!(writer, "Total log entries: {}", self.total)?;
        writeln!(writer)?;
        writeln!(writer, "Log count by level:")?;
        for (level, count) in &self.by_level {
            writeln!(writer, "{level}: {count}")?;
        }
        writeln!(writer)?;
        writeln!(writer, "Top {} root causes:", Self::TOP_ROOT_CAUSES)?;
        for entry in &self.top_root_causes {
            writeln!(writer, "{} → {}", entry.cause, entry.count)?;
        }
        Ok(())
    }
}

impl TableDisplay for IngestReport {
    fn write_table<W: Write>(&self, writer: &mut W, _color: bool) -> Result<(), CliError> {
        writeln!(writer, "Ingestion complete")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Lines read:       {}", self.lines_read)?;
        writeln!(writer, "Inserted:         {}", self.inserted)?;
        writeln!(writer, "Duplicates:       {}", self.duplicates)?;
        writeln!(writer, "Skipped:          {}", self.skipped)?;
        Ok(())
    }
}
