//! Error types for classification, storage and ingestion.
//!
//! Lines that do not match the recognised shape and duplicate inserts are
//! not errors: the former yield `None` from the classifier, the latter an
//! [`InsertOutcome::Duplicate`](crate::types::InsertOutcome::Duplicate).

use std::path::PathBuf;

use thiserror::Error;

use crate::types::IngestReport;

/// Errors that can occur in the log pipeline.
#[derive(Debug, Error)]
pub enum LogError {
    /// The storage engine rejected or failed an operation.
    #[error("storage unavailable: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The database location could not be prepared.
    #[error("storage unavailable: cannot prepare {path}: {source}")]
    StorageSetup {
        /// Path of the database file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The ingestion source could not be opened or failed mid-read.
    ///
    /// Rows handed to the store before the failure stay persisted; `partial`
    /// describes how far ingestion got.
    #[error("source unreadable: {path}: {source}")]
    SourceUnreadable {
        /// Path (or name) of the source.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
        /// Progress made before the failure.
        partial: IngestReport,
    },

    /// Query parameters were rejected before reaching storage.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A level string outside INFO, WARN and ERROR.
    #[error("invalid log level: {0}")]
    InvalidLevel(String),

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LogError {
    /// Returns true for failures of the persistence layer.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::StorageSetup { .. })
    }

    /// Returns true for rejected caller input.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidQuery(_) | Self::InvalidLevel(_))
    }

    /// Progress recorded before a source failure, if this is one.
    #[must_use]
    pub const fn partial_report(&self) -> Option<&IngestReport> {
        match self {
            Self::SourceUnreadable { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Result type alias for log operations.
pub type Result<T> = std::result::Result<T, LogError>;
