//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`ingest`] - Parse a log file into the store
//! - [`summary`] - Totals, per-level counts and top root causes
//! - [`query`] - Paginated listing and searches
//! - [`console`] - Interactive menu-driven session

pub mod console;
pub mod ingest;
pub mod query;
pub mod summary;

pub use console::Console;
pub use ingest::IngestCommand;
pub use query::QueryCommand;
pub use summary::SummaryCommand;
