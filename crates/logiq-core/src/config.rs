//! Runtime configuration.
//!
//! [`LogiqConfig`] can be loaded from a JSON file; every field is optional
//! and falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LogError, Result};
use crate::store::DEFAULT_BATCH_SIZE;

/// Default location of the database file.
pub const DEFAULT_DATABASE_PATH: &str = "db/logiq.db";

/// Default location of the diagnostics log.
pub const DEFAULT_DIAGNOSTICS_PATH: &str = "logiq_app.log";

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Configuration shared by the store, the ingestor and the console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogiqConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Records per batch transaction and per ingestor hand-off.
    pub batch_size: usize,
    /// Default page size for listings.
    pub page_size: u32,
    /// File receiving internal diagnostics.
    pub diagnostics_path: PathBuf,
}

impl Default for LogiqConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            diagnostics_path: PathBuf::from(DEFAULT_DIAGNOSTICS_PATH),
        }
    }
}

impl LogiqConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| LogError::Config(format!("cannot read {}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Checks that sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Config`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LogError::Config("batch_size must be at least 1".to_string()));
        }
        if self.page_size == 0 {
            return Err(LogError::Config("page_size must be at least 1".to_string()));
        }
        if self.database_path.as_os_str().is_empty() {
            return Err(LogError::Config("database_path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Sets the database path.
    #[must_use]
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = path.into();
        self
    }

    /// Sets the batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the default page size.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the diagnostics log path.
    #[must_use]
    pub fn with_diagnostics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.diagnostics_path = path.into();
        self
    }
}
