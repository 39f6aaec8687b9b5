//! # logiq-core
//!
//! Log line classification and deduplicated storage for LogIQ.
//!
//! This crate provides:
//!
//! - [`Classifier`] — Parses `TIMESTAMP LEVEL MESSAGE` lines and infers a root cause
//! - [`LogRecord`] / [`StoredRecord`] — Classified entries before and after persistence
//! - [`RecordStore`] — Abstract trait for deduplicating, paginated storage
//! - [`SqliteStore`] — SQLite implementation of [`RecordStore`]
//! - [`Ingestor`] — Streams a file through the classifier into a store
//! - [`LogFilter`] / [`PageRequest`] — Query shapes and pagination
//! - [`Summary`] — Totals, per-level counts and top root causes
//! - [`LogiqConfig`] — File-backed runtime configuration
//!
//! ## Example
//!
//! ```rust
//! use logiq_core::{Classifier, LogLevel, PageRequest, RecordStore, RootCause, SqliteStore};
//!
//! let record = Classifier::new()
//!     .classify("2025-10-04 15:46:10 ERROR NullPointer in handler")
//!     .expect("line has the recognised shape");
//! assert_eq!(record.level, LogLevel::Error);
//! assert_eq!(record.root_cause, Some(RootCause::NullPointer));
//!
//! let store = SqliteStore::open_in_memory()?;
//! store.insert_one(&record)?;
//! store.insert_one(&record)?; // duplicate, silently ignored
//!
//! let page = store.fetch_page(PageRequest::first(10))?;
//! assert_eq!(page.len(), 1);
//! # Ok::<(), logiq_core::LogError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod ingest;
pub mod store;
pub mod traits;
pub mod types;

// Re-export main types
pub use classifier::{Classifier, RootCauseRule, DEFAULT_ROOT_CAUSE_RULES};
pub use config::LogiqConfig;
pub use error::{LogError, Result};
pub use ingest::Ingestor;
pub use store::{SqliteStore, DEFAULT_BATCH_SIZE};
pub use traits::RecordStore;
pub use types::{
    BatchReport, IngestReport, InsertOutcome, LogFilter, LogId, LogLevel, LogRecord, Page,
    PageRequest, RootCause, RootCauseCount, StoredRecord, Summary, Timestamp,
};
