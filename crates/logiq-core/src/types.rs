//! Core types for classified log records.
//!
//! This module provides:
//! - [`LogLevel`] — The closed set of recognised severities
//! - [`RootCause`] — The closed set of inferred root-cause tags
//! - [`Timestamp`] — Fixed-format `YYYY-MM-DD HH:MM:SS` timestamps
//! - [`LogRecord`] / [`StoredRecord`] — Classified entries before and after persistence
//! - [`LogFilter`], [`PageRequest`], [`Page`] — Query shapes and pagination
//! - [`Summary`] — Aggregate counts over the whole store

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LogError, Result};

/// Format of every stored timestamp. Lexicographic order equals chronological order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static TIMESTAMP_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$")
        .unwrap_or_else(|_| unreachable!("timestamp pattern is a valid regex"))
});

/// Surrogate identity assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogId(pub i64);

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Log severity levels, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// General information
    Info,
    /// Warning conditions
    Warn,
    /// Error conditions
    Error,
}

impl LogLevel {
    /// Every recognised level, in severity order.
    pub const ALL: [Self; 3] = [Self::Info, Self::Warn, Self::Error];

    /// Returns the wire representation used in source lines and storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }

    /// Parses a user-supplied level selector, case-insensitively.
    ///
    /// `ALL` is the wildcard and yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidLevel`] for anything else.
    pub fn parse_selector(input: &str) -> Result<Option<Self>> {
        let upper = input.trim().to_uppercase();
        if upper == "ALL" {
            return Ok(None);
        }
        upper.parse().map(Some)
    }
}

impl FromStr for LogLevel {
    type Err = LogError;

    /// Exact, case-sensitive match on the wire representation.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INFO" => Ok(Self::Info),
            "WARN" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(LogError::InvalidLevel(other.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Root-cause tags inferred from message keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RootCause {
    /// Message mentions `NullPointer`
    NullPointer,
    /// Message mentions `Timeout`
    Timeout,
    /// Message mentions `IndexOutOfBounds`
    IndexOutOfBounds,
}

impl RootCause {
    /// Returns the tag as stored.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NullPointer => "NullPointer",
            Self::Timeout => "Timeout",
            Self::IndexOutOfBounds => "IndexOutOfBounds",
        }
    }
}

impl FromStr for RootCause {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NullPointer" => Ok(Self::NullPointer),
            "Timeout" => Ok(Self::Timeout),
            "IndexOutOfBounds" => Ok(Self::IndexOutOfBounds),
            other => Err(LogError::InvalidQuery(format!("unknown root cause: {other}"))),
        }
    }
}

impl fmt::Display for RootCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A `YYYY-MM-DD HH:MM:SS` timestamp kept verbatim as text.
///
/// Deserialization goes through [`Timestamp::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Timestamp(String);

impl Timestamp {
    /// Parses a timestamp supplied as a query bound.
    ///
    /// The input must be zero-padded `YYYY-MM-DD HH:MM:SS` and name a real
    /// calendar date and time, so that string comparison stays chronological.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidQuery`] if the input has any other shape.
    pub fn parse(input: &str) -> Result<Self> {
        if !TIMESTAMP_SHAPE.is_match(input) {
            return Err(LogError::InvalidQuery(format!(
                "timestamp must look like YYYY-MM-DD HH:MM:SS, got {input:?}"
            )));
        }
        NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT)
            .map_err(|e| LogError::InvalidQuery(format!("invalid timestamp {input:?}: {e}")))?;
        Ok(Self(input.to_string()))
    }

    /// Wraps text already known to have the timestamp shape.
    pub(crate) fn from_matched(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the timestamp text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Timestamp {
    type Error = LogError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Timestamp> for String {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A classified log entry that has not been persisted yet.
///
/// The tuple of all four fields is the deduplication key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogRecord {
    /// When the line was logged
    pub timestamp: Timestamp,
    /// Severity level
    pub level: LogLevel,
    /// Free-text remainder of the line
    pub message: String,
    /// Inferred root cause, if any keyword matched
    pub root_cause: Option<RootCause>,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:<5} | {} | Root Cause: {}",
            self.timestamp,
            self.level,
            self.message,
            self.root_cause.map_or("N/A", |c| c.as_str())
        )
    }
}

/// A persisted record with its store-assigned identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Identity assigned on insert
    pub id: LogId,
    /// The record content
    #[serde(flatten)]
    pub record: LogRecord,
}

/// Query filter; exactly one criterion applies per query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum LogFilter {
    /// Every record, ordered by id
    #[default]
    All,
    /// Exact level match, ordered by id
    Level {
        /// Level to match
        level: LogLevel,
    },
    /// Case-sensitive substring of the message, ordered by id
    Message {
        /// Substring to look for
        contains: String,
    },
    /// Case-sensitive substring of the root cause, ordered by id.
    /// Records without a root cause never match.
    RootCause {
        /// Substring to look for
        contains: String,
    },
    /// Inclusive timestamp range, ordered by timestamp then id
    DateRange {
        /// Lower bound (inclusive)
        start: Timestamp,
        /// Upper bound (inclusive)
        end: Timestamp,
    },
}

impl LogFilter {
    /// Creates a filter that matches every record.
    #[must_use]
    pub const fn all() -> Self {
        Self::All
    }

    /// Filters by level; `None` is the "all levels" wildcard.
    #[must_use]
    pub const fn level(level: Option<LogLevel>) -> Self {
        match level {
            Some(level) => Self::Level { level },
            None => Self::All,
        }
    }

    /// Filters by message substring.
    #[must_use]
    pub fn message(contains: impl Into<String>) -> Self {
        Self::Message {
            contains: contains.into(),
        }
    }

    /// Filters by root-cause substring.
    #[must_use]
    pub fn root_cause(contains: impl Into<String>) -> Self {
        Self::RootCause {
            contains: contains.into(),
        }
    }

    /// Filters by an inclusive timestamp range.
    #[must_use]
    pub const fn date_range(start: Timestamp, end: Timestamp) -> Self {
        Self::DateRange { start, end }
    }

    /// Checks a record against this filter.
    #[cfg(test)]
    pub(crate) fn matches(&self, record: &LogRecord) -> bool {
        match self {
            Self::All => true,
            Self::Level { level } => record.level == *level,
            Self::Message { contains } => record.message.contains(contains.as_str()),
            Self::RootCause { contains } => record
                .root_cause
                .is_some_and(|c| c.as_str().contains(contains.as_str())),
            Self::DateRange { start, end } => {
                *start <= record.timestamp && record.timestamp <= *end
            }
        }
    }

    /// Returns true if results are ordered by timestamp rather than id.
    #[must_use]
    pub const fn orders_by_timestamp(&self) -> bool {
        matches!(self, Self::DateRange { .. })
    }
}

/// A bounded, offset-based slice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    limit: u64,
    offset: u64,
}

impl PageRequest {
    /// Creates a page request from caller-supplied values.
    ///
    /// A zero limit is accepted and yields an empty page without touching storage.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidQuery`] if `limit` or `offset` is negative.
    pub fn new(limit: i64, offset: i64) -> Result<Self> {
        let limit = u64::try_from(limit)
            .map_err(|_| LogError::InvalidQuery(format!("limit must not be negative, got {limit}")))?;
        let offset = u64::try_from(offset).map_err(|_| {
            LogError::InvalidQuery(format!("offset must not be negative, got {offset}"))
        })?;
        Ok(Self { limit, offset })
    }

    /// Creates a request for the first `limit` rows.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self {
            limit: limit as u64,
            offset: 0,
        }
    }

    /// Creates a request for the zero-based page `index` of `size` rows.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::InvalidQuery`] if the offset would overflow.
    pub fn nth(index: u64, size: u32) -> Result<Self> {
        let offset = index
            .checked_mul(u64::from(size))
            .filter(|o| i64::try_from(*o).is_ok())
            .ok_or_else(|| LogError::InvalidQuery(format!("page {index} is out of range")))?;
        Ok(Self {
            limit: u64::from(size),
            offset,
        })
    }

    /// Maximum number of rows to return.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of rows to skip.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// The request immediately following this one.
    #[must_use]
    pub const fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_add(self.limit),
        }
    }

    /// The request immediately preceding this one, clamped at offset zero.
    #[must_use]
    pub const fn previous(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset.saturating_sub(self.limit),
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Rows on this page, in query order
    pub records: Vec<StoredRecord>,
    /// The request that produced this page
    pub request: PageRequest,
}

impl Page {
    /// Creates an empty page for the given request.
    #[must_use]
    pub const fn empty(request: PageRequest) -> Self {
        Self {
            records: Vec::new(),
            request,
        }
    }

    /// Number of rows returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if no rows were returned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if no further page can hold rows.
    ///
    /// A zero-limit page is always last, since `next()` would not advance.
    #[must_use]
    pub fn is_last(&self) -> bool {
        self.request.limit() == 0 || (self.records.len() as u64) < self.request.limit()
    }
}

/// Outcome of inserting a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertOutcome {
    /// A new row was created
    Inserted(LogId),
    /// An identical record already existed; nothing was written
    Duplicate,
}

/// Tally of a batch insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Rows created
    pub inserted: u64,
    /// Records ignored as duplicates
    pub duplicates: u64,
}

impl BatchReport {
    /// Records one insert outcome.
    pub fn record(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted(_) => self.inserted += 1,
            InsertOutcome::Duplicate => self.duplicates += 1,
        }
    }
}

/// Tally of ingesting one source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Lines read from the source
    pub lines_read: u64,
    /// Rows created
    pub inserted: u64,
    /// Matched lines already present in the store
    pub duplicates: u64,
    /// Lines that did not match the recognised shape
    pub skipped: u64,
}

impl IngestReport {
    /// Folds a batch tally into this report.
    pub fn absorb(&mut self, batch: BatchReport) {
        self.inserted += batch.inserted;
        self.duplicates += batch.duplicates;
    }

    /// Lines that classified into a record.
    #[must_use]
    pub const fn matched(&self) -> u64 {
        self.inserted + self.duplicates
    }
}

/// Occurrences of one root cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootCauseCount {
    /// The cause
    pub cause: RootCause,
    /// Rows tagged with it
    pub count: u64,
}

/// Aggregate counts over every stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Total number of rows
    pub total: u64,
    /// Rows per level; levels without rows are absent
    pub by_level: BTreeMap<LogLevel, u64>,
    /// At most three causes, most frequent first
    pub top_root_causes: Vec<RootCauseCount>,
}

impl Summary {
    /// Maximum number of root causes reported.
    pub const TOP_ROOT_CAUSES: usize = 3;

    /// Rows at the given level.
    #[must_use]
    pub fn count_for(&self, level: LogLevel) -> u64 {
        self.by_level.get(&level).copied().unwrap_or(0)
    }
}
