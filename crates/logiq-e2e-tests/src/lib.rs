//! End-to-end integration tests for LogIQ.
//!
//! These tests exercise the full pipeline over the public API:
//! - File ingestion through the classifier into SQLite
//! - Deduplication across repeated ingests
//! - Paginated listing and filtered searches
//! - Summary aggregation

#![cfg(test)]
