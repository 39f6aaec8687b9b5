//! Traits for record storage backends.
//!
//! [`RecordStore`] is the single persistence seam. Every query shape goes
//! through [`RecordStore::fetch`] with a [`LogFilter`], so pagination and
//! ordering are implemented once per backend; the `search_*` helpers only
//! build the filter.

use crate::error::Result;
use crate::types::{
    BatchReport, InsertOutcome, LogFilter, LogId, LogLevel, LogRecord, Page, PageRequest,
    StoredRecord, Summary, Timestamp,
};

/// Trait for record storage backends.
///
/// Implementors own the uniqueness invariant: a record whose
/// `(timestamp, level, message, root_cause)` tuple is already stored is
/// ignored, never duplicated and never reported as an error.
pub trait RecordStore: Send + Sync {
    /// Creates the persistent structure if it does not exist yet.
    ///
    /// Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    fn ensure_schema(&self) -> Result<()>;

    /// Inserts one record, reporting whether it was new.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails. Duplicates are not errors.
    fn insert_one(&self, record: &LogRecord) -> Result<InsertOutcome>;

    /// Inserts many records, applying the same deduplication per record.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails. Chunks committed before
    /// the failure stay persisted.
    fn insert_batch(&self, records: &[LogRecord]) -> Result<BatchReport>;

    /// Returns one page of records matching the filter.
    ///
    /// Results are ordered by id ascending, except for
    /// [`LogFilter::DateRange`] which orders by timestamp ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn fetch(&self, filter: &LogFilter, page: PageRequest) -> Result<Page>;

    /// Gets a specific record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn get(&self, id: LogId) -> Result<Option<StoredRecord>>;

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn count(&self) -> Result<u64>;

    /// Aggregates totals, per-level counts and the top root causes.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn summarize(&self) -> Result<Summary>;

    /// Returns true if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    /// Returns one page of all records in id order.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn fetch_page(&self, page: PageRequest) -> Result<Page> {
        self.fetch(&LogFilter::All, page)
    }

    /// Returns records at `level`; `None` means every level.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn search_by_level(&self, level: Option<LogLevel>, page: PageRequest) -> Result<Page> {
        self.fetch(&LogFilter::level(level), page)
    }

    /// Returns records whose message contains `needle` (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn search_by_message(&self, needle: &str, page: PageRequest) -> Result<Page> {
        self.fetch(&LogFilter::message(needle), page)
    }

    /// Returns records whose root cause contains `needle` (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn search_by_root_cause(&self, needle: &str, page: PageRequest) -> Result<Page> {
        self.fetch(&LogFilter::root_cause(needle), page)
    }

    /// Returns records with `start <= timestamp <= end`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage layer fails.
    fn search_by_date_range(
        &self,
        start: &Timestamp,
        end: &Timestamp,
        page: PageRequest,
    ) -> Result<Page> {
        self.fetch(&LogFilter::date_range(start.clone(), end.clone()), page)
    }
}
