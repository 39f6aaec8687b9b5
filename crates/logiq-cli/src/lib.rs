//! # logiq-cli
//!
//! LogIQ command-line interface.
//!
//! Provides commands for:
//! - Ingesting application log files into the local store
//! - Summarising totals, levels and top root causes
//! - Paginated listing and searches (level, message, root cause, date range)
//! - An interactive menu-driven console
//!
//! # Architecture
//!
//! Every command works against a [`logiq_core::RecordStore`]; the binary
//! opens a [`logiq_core::SqliteStore`] from the resolved configuration.
//!
//! ```text
//! ┌────────────┐   RecordStore    ┌──────────────┐
//! │ logiq-cli  │─────────────────►│  logiq-core  │──► SQLite
//! └────────────┘                  └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod diagnostics;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, PageArgs, SearchCommands};
pub use diagnostics::Diagnostics;
pub use error::CliError;
pub use output::OutputFormat;
