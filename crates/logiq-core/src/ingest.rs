//! Streaming ingestion of log files.
//!
//! The [`Ingestor`] reads a source one line at a time, classifies each line
//! and hands matched records to the store every `batch_size` records. Memory
//! use is bounded by one line plus one batch, whatever the source size.
//!
//! A read failure stops ingestion. Records already handed to the store stay
//! persisted; nothing is rolled back.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::classifier::Classifier;
use crate::error::{LogError, Result};
use crate::store::DEFAULT_BATCH_SIZE;
use crate::traits::RecordStore;
use crate::types::{IngestReport, LogRecord};

/// Feeds classified lines from a source into a [`RecordStore`].
pub struct Ingestor<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    classifier: Classifier,
    batch_size: usize,
}

impl<'a, S: RecordStore + ?Sized> Ingestor<'a, S> {
    /// Creates an ingestor with the built-in classifier.
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self::with_classifier(store, Classifier::new())
    }

    /// Creates an ingestor with a custom classifier.
    #[must_use]
    pub const fn with_classifier(store: &'a S, classifier: Classifier) -> Self {
        Self {
            store,
            classifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets how many matched records are staged before each hand-off.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Ingests a file line by line.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::SourceUnreadable`] if the file cannot be opened or
    /// a read fails, and a storage error if a hand-off fails.
    pub fn ingest_file(&self, path: impl AsRef<Path>) -> Result<IngestReport> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LogError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
            partial: IngestReport::default(),
        })?;
        self.ingest_reader(BufReader::new(file), path)
    }

    /// Ingests any buffered source; `source` names it in errors and diagnostics.
    ///
    /// Lines end at `\n`, `\r\n` or a lone `\r`; terminators are stripped.
    /// Lines that are not valid UTF-8 are counted as skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::SourceUnreadable`] if a read fails, and a storage
    /// error if a hand-off fails.
    pub fn ingest_reader<R: BufRead>(&self, mut reader: R, source: &Path) -> Result<IngestReport> {
        let mut report = IngestReport::default();
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut buf = Vec::new();
        let mut skip_lf = false;

        loop {
            buf.clear();
            match read_line(&mut reader, &mut buf, &mut skip_lf) {
                Ok(false) => break,
                Ok(true) => {}
                Err(err) => {
                    self.flush(&mut batch, &mut report)?;
                    warn!(source = %source.display(), error = %err, ?report, "ingestion aborted");
                    return Err(LogError::SourceUnreadable {
                        path: source.to_path_buf(),
                        source: err,
                        partial: report,
                    });
                }
            }
            report.lines_read += 1;

            let Ok(line) = std::str::from_utf8(&buf) else {
                warn!(source = %source.display(), line = report.lines_read, "skipping line that is not valid UTF-8");
                report.skipped += 1;
                continue;
            };

            match self.classifier.classify(line) {
                Some(record) => {
                    batch.push(record);
                    if batch.len() >= self.batch_size {
                        self.flush(&mut batch, &mut report)?;
                    }
                }
                None => report.skipped += 1,
            }
        }

        self.flush(&mut batch, &mut report)?;
        info!(
            source = %source.display(),
            lines = report.lines_read,
            inserted = report.inserted,
            duplicates = report.duplicates,
            skipped = report.skipped,
            "ingestion complete"
        );
        Ok(report)
    }

    fn flush(&self, batch: &mut Vec<LogRecord>, report: &mut IngestReport) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let outcome = self.store.insert_batch(batch)?;
        debug!(handed = batch.len(), ?outcome, "handed batch to store");
        report.absorb(outcome);
        batch.clear();
        Ok(())
    }
}

/// Reads one line into `buf` without its terminator; `false` at end of input.
///
/// A line ends at `\n`, `\r\n` or a lone `\r`. `skip_lf` carries a pending
/// `\r` across calls so a `\n` split from it by the buffer is not a new line.
fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>, skip_lf: &mut bool) -> io::Result<bool> {
    let mut read_any = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if available.is_empty() {
            return Ok(read_any);
        }
        if *skip_lf {
            *skip_lf = false;
            if available[0] == b'\n' {
                reader.consume(1);
                continue;
            }
        }
        if let Some(end) = available.iter().position(|&b| b == b'\n' || b == b'\r') {
            buf.extend_from_slice(&available[..end]);
            *skip_lf = available[end] == b'\r';
            reader.consume(end + 1);
            return Ok(true);
        }
        let len = available.len();
        buf.extend_from_slice(available);
        reader.consume(len);
        read_any = true;
    }
}
