//! Ingest command implementation.
//!
//! Streams a log file through the classifier into the store.

use std::io::Write;
use std::path::Path;

use logiq_core::{IngestReport, Ingestor, LogError, RecordStore, DEFAULT_BATCH_SIZE};
use tracing::warn;

use crate::error::CliError;
use crate::output::OutputFormat;

/// Handler for the ingest command.
pub struct IngestCommand<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    batch_size: usize,
}

impl<'a, S: RecordStore + ?Sized> IngestCommand<'a, S> {
    /// Creates a new ingest command handler.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets how many records are handed to the store at a time.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Ingests `path` and writes the resulting report.
    ///
    /// When the source fails part-way, the partial report is written before
    /// the error is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreadable, storage fails or output fails.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        path: &Path,
    ) -> Result<IngestReport, CliError> {
        match self.ingest(path) {
            Ok(report) => {
                format.write(out, &report)?;
                Ok(report)
            }
            Err(err) => {
                if let Some(partial) = err.partial_report().filter(|p| p.lines_read > 0) {
                    warn!(path = %path.display(), ?partial, "ingestion stopped early");
                    format.write(out, partial)?;
                }
                Err(err.into())
            }
        }
    }

    /// Ingests `path` without rendering anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is unreadable or storage fails.
    pub fn ingest(&self, path: &Path) -> Result<IngestReport, LogError> {
        Ingestor::new(self.store)
            .with_batch_size(self.batch_size)
            .ingest_file(path)
    }
}
