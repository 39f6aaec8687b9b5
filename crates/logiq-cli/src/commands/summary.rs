//! Summary command implementation.

use std::io::Write;

use logiq_core::{RecordStore, Summary};

use crate::error::CliError;
use crate::output::OutputFormat;

/// Handler for the summary command.
pub struct SummaryCommand<'a, S: RecordStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RecordStore + ?Sized> SummaryCommand<'a, S> {
    /// Creates a new summary command handler.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Computes and writes the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if storage or output fails.
    pub fn execute<W: Write>(&self, out: &mut W, format: &OutputFormat) -> Result<Summary, CliError> {
        let summary = self.store.summarize()?;
        format.write(out, &summary)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logiq_core::{Classifier, LogLevel, RootCause, SqliteStore};

    #[test]
    fn summary_counts_levels_and_causes() {
        let store = SqliteStore::open_in_memory().expect("store");
        let classifier = Classifier::new();
        let lines = [
            "2025-10-04 15:45:00 INFO System started",
            "2025-10-04 15:46:10 ERROR NullPointer in handler",
            "2025-10-04 15:47:10 ERROR Timeout waiting for db",
            "2025-10-04 15:48:10 WARN Timeout retrying",
        ];
        let records: Vec<_> = lines.iter().filter_map(|l| classifier.classify(l)).collect();
        store.insert_batch(&records).expect("insert");

        let mut out = Vec::new();
        let summary = SummaryCommand::new(&store)
            .execute(&mut out, &OutputFormat::default())
            .expect("summary");

        assert_eq!(summary.total, 4);
        assert_eq!(summary.count_for(LogLevel::Error), 2);
        assert_eq!(summary.top_root_causes[0].cause, RootCause::Timeout);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Total log entries: 4"));
        assert!(text.contains("Timeout → 2"));
    }

    #[test]
    fn summary_of_empty_store() {
        let store = SqliteStore::open_in_memory().expect("store");
        let mut out = Vec::new();
        let summary = SummaryCommand::new(&store)
            .execute(&mut out, &OutputFormat::default())
            .expect("summary");
        assert_eq!(summary, Summary::default());
    }
}
