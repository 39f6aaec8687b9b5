//! Interactive menu-driven console.
//!
//! The console reads choices from any [`BufRead`] and writes to any
//! [`Write`], so a session can be scripted in tests. End of input closes
//! the session like choosing "Exit". Errors from a single action are
//! reported and the menu is shown again; only I/O failures on the console
//! streams end the session early.

use std::io::{BufRead, Write};
use std::path::Path;

use logiq_core::config::DEFAULT_PAGE_SIZE;
use logiq_core::{LogFilter, PageRequest, RecordStore, DEFAULT_BATCH_SIZE};
use tracing::{error, info};

use crate::commands::query::{level_filter, range_filter, title_for};
use crate::commands::{IngestCommand, SummaryCommand};
use crate::error::CliError;
use crate::output::{Listing, OutputFormat};

const MENU: &str = "\
Select an operation:
1. Parse log file and insert entries
2. Generate log summary
3. Fetch all logs
4. Search logs by level (INFO/WARN/ERROR/ALL)
5. Search logs by message content
6. Search logs by root cause
7. Search logs by date range
8. Exit";

/// Whether the session continues after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Interactive session over a record store.
pub struct Console<'a, S: RecordStore + ?Sized, R, W> {
    store: &'a S,
    input: R,
    output: W,
    format: OutputFormat,
    batch_size: usize,
    page_size: u32,
}

impl<'a, S, R, W> Console<'a, S, R, W>
where
    S: RecordStore + ?Sized,
    R: BufRead,
    W: Write,
{
    /// Creates a console reading from `input` and writing to `output`.
    pub fn new(store: &'a S, input: R, output: W, format: OutputFormat) -> Self {
        Self {
            store,
            input,
            output,
            format,
            batch_size: DEFAULT_BATCH_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the ingestion batch size.
    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the page size used when the page-size prompt is left blank.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Runs the menu loop until "Exit" or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run(&mut self) -> Result<(), CliError> {
        writeln!(
            self.output,
            "===== Welcome to LogIQ - Automated Log Root Cause Classifier =====\n"
        )?;
        info!("console session started");

        loop {
            writeln!(self.output, "\n{MENU}")?;
            let Some(choice) = self.prompt("Enter your choice (1-8): ")? else {
                break;
            };

            let flow = match self.dispatch(choice.trim()) {
                Ok(flow) => flow,
                Err(CliError::Io(err)) => return Err(CliError::Io(err)),
                Err(err) => {
                    error!(error = %err, choice = %choice.trim(), "console action failed");
                    writeln!(self.output, "⚠️ {err}")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Exit {
                break;
            }
        }

        writeln!(self.output, "\n===== End of LogIQ Session =====")?;
        info!("console session ended");
        Ok(())
    }

    fn dispatch(&mut self, choice: &str) -> Result<Flow, CliError> {
        match choice {
            "1" => self.ingest(),
            "2" => {
                writeln!(self.output, "📊 Generating log summary:")?;
                SummaryCommand::new(self.store).execute(&mut self.output, &self.format)?;
                Ok(Flow::Continue)
            }
            "3" => self.browse(&LogFilter::All),
            "4" => {
                let Some(level) = self.prompt("Enter log level to search (INFO/WARN/ERROR/ALL): ")?
                else {
                    return Ok(Flow::Exit);
                };
                let (title, filter) = match level_filter(&level) {
                    Ok(found) => found,
                    Err(CliError::Core(err)) if err.is_invalid_input() => {
                        writeln!(
                            self.output,
                            "⚠️ Invalid log level. Please enter INFO, WARN, ERROR, or ALL."
                        )?;
                        return Ok(Flow::Continue);
                    }
                    Err(err) => return Err(err),
                };
                self.browse_titled(&title, &filter)
            }
            "5" => {
                let Some(text) = self.prompt("Enter keyword to search in message: ")? else {
                    return Ok(Flow::Exit);
                };
                self.browse(&LogFilter::message(text))
            }
            "6" => {
                let Some(text) = self.prompt("Enter root cause keyword to search: ")? else {
                    return Ok(Flow::Exit);
                };
                self.browse(&LogFilter::root_cause(text))
            }
            "7" => {
                let Some(start) = self.prompt("Enter start timestamp (YYYY-MM-DD HH:MM:SS): ")?
                else {
                    return Ok(Flow::Exit);
                };
                let Some(end) = self.prompt("Enter end timestamp (YYYY-MM-DD HH:MM:SS): ")? else {
                    return Ok(Flow::Exit);
                };
                let filter = range_filter(&start, &end)?;
                self.browse(&filter)
            }
            "8" => {
                writeln!(self.output, "👋 Exiting LogIQ. Goodbye!")?;
                Ok(Flow::Exit)
            }
            _ => {
                writeln!(
                    self.output,
                    "⚠️ Invalid choice. Please enter a number between 1-8."
                )?;
                Ok(Flow::Continue)
            }
        }
    }

    fn ingest(&mut self) -> Result<Flow, CliError> {
        let Some(path) = self.prompt("Enter log file path: ")? else {
            return Ok(Flow::Exit);
        };
        writeln!(self.output, "📂 Parsing and inserting logs...")?;
        IngestCommand::new(self.store)
            .with_batch_size(self.batch_size)
            .execute(&mut self.output, &self.format, Path::new(path.trim()))?;
        Ok(Flow::Continue)
    }

    fn browse(&mut self, filter: &LogFilter) -> Result<Flow, CliError> {
        self.browse_titled(&title_for(filter), filter)
    }

    /// Asks for a page size, then pages through `filter` with n/p/q.
    fn browse_titled(&mut self, title: &str, filter: &LogFilter) -> Result<Flow, CliError> {
        let Some(size) = self.prompt("Enter page size: ")? else {
            return Ok(Flow::Exit);
        };
        let request = self.page_request(size.trim())?;

        let mut current = self.store.fetch(filter, request)?;
        if current.is_empty() {
            writeln!(self.output, "No logs found.")?;
            return Ok(Flow::Continue);
        }

        let mut show = true;
        loop {
            if show {
                let listing = Listing::new(title, current);
                self.format.write(&mut self.output, &listing)?;
                current = listing.page;
            }
            show = false;

            let Some(nav) = self.prompt("n=next, p=prev, q=quit: ")? else {
                return Ok(Flow::Exit);
            };
            match nav.trim().to_ascii_lowercase().as_str() {
                "n" => {
                    let next = if current.is_last() {
                        None
                    } else {
                        Some(self.store.fetch(filter, current.request.next())?)
                    };
                    match next.filter(|page| !page.is_empty()) {
                        Some(page) => {
                            current = page;
                            show = true;
                        }
                        None => writeln!(self.output, "Already at the last page.")?,
                    }
                }
                "p" => {
                    if current.request.offset() == 0 {
                        writeln!(self.output, "Already at the first page.")?;
                    } else {
                        current = self.store.fetch(filter, current.request.previous())?;
                        show = true;
                    }
                }
                "q" => return Ok(Flow::Continue),
                _ => writeln!(self.output, "Please enter n, p or q.")?,
            }
        }
    }

    fn page_request(&self, input: &str) -> Result<PageRequest, CliError> {
        if input.is_empty() {
            return Ok(PageRequest::first(self.page_size));
        }
        let size: i64 = input.parse().map_err(|_| {
            CliError::InvalidArgument(format!("page size must be a number, got '{input}'"))
        })?;
        if size == 0 {
            return Err(CliError::InvalidArgument("page size must be at least 1".into()));
        }
        Ok(PageRequest::new(size, 0)?)
    }

    /// Writes `message` and reads one line; `None` at end of input.
    fn prompt(&mut self, message: &str) -> Result<Option<String>, CliError> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }
}
