//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use logiq_core::{LogiqConfig, PageRequest};

use crate::error::CliError;

/// LogIQ - Automated log root cause classifier.
#[derive(Parser, Debug, Clone)]
#[command(name = "logiq")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// JSON configuration file.
    #[arg(short, long, env = "LOGIQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides the configuration).
    #[arg(long, env = "LOGIQ_DB")]
    pub db: Option<PathBuf>,

    /// File receiving internal diagnostics (overrides the configuration).
    #[arg(long, env = "LOGIQ_DIAGNOSTICS_LOG")]
    pub diagnostics_log: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Disable coloured levels in table output.
    #[arg(long)]
    pub no_color: bool,

    /// Subcommand to execute; the interactive console when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Parse a log file and store its entries.
    Ingest {
        /// Log file to read.
        path: PathBuf,
    },

    /// Show totals, per-level counts and the top root causes.
    Summary,

    /// List stored entries in insertion order.
    List(PageArgs),

    /// Search stored entries.
    Search {
        /// Search subcommand to execute.
        #[command(subcommand)]
        command: SearchCommands,
    },

    /// Interactive menu-driven console.
    Console,
}

/// Search subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SearchCommands {
    /// Entries at a level (INFO, WARN, ERROR or ALL).
    Level {
        /// Level to match, case-insensitive.
        level: String,
        /// Page selection.
        #[command(flatten)]
        page: PageArgs,
    },

    /// Entries whose message contains the text (case-sensitive).
    Message {
        /// Text to look for.
        text: String,
        /// Page selection.
        #[command(flatten)]
        page: PageArgs,
    },

    /// Entries whose root cause contains the text (case-sensitive).
    RootCause {
        /// Text to look for.
        text: String,
        /// Page selection.
        #[command(flatten)]
        page: PageArgs,
    },

    /// Entries between two timestamps, inclusive, oldest first.
    Range {
        /// Start, `YYYY-MM-DD HH:MM:SS`.
        start: String,
        /// End, `YYYY-MM-DD HH:MM:SS`.
        end: String,
        /// Page selection.
        #[command(flatten)]
        page: PageArgs,
    },
}

/// Page selection shared by listing commands.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageArgs {
    /// Rows per page (defaults to the configured page size).
    #[arg(short, long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Zero-based page number.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
    pub page: i64,
}

impl PageArgs {
    /// Converts to a page request, falling back to `default_limit`.
    ///
    /// # Errors
    ///
    /// Returns an error for negative values or an offset that overflows.
    pub fn to_request(&self, default_limit: u32) -> Result<PageRequest, CliError> {
        let limit = self.limit.unwrap_or_else(|| i64::from(default_limit));
        let offset = self
            .page
            .checked_mul(limit)
            .ok_or_else(|| CliError::InvalidArgument(format!("page {} is out of range", self.page)))?;
        Ok(PageRequest::new(limit, offset)?)
    }
}

impl Cli {
    /// Builds the effective configuration: file (if any), then flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the result is invalid.
    pub fn resolve_config(&self) -> Result<LogiqConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => LogiqConfig::load(path)?,
            None => LogiqConfig::default(),
        };
        if let Some(db) = &self.db {
            config.database_path.clone_from(db);
        }
        if let Some(path) = &self.diagnostics_log {
            config.diagnostics_path.clone_from(path);
        }
        config.validate()?;
        Ok(config)
    }
}
