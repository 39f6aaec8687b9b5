//! Listing and search commands.
//!
//! Each query resolves to a [`LogFilter`] plus a [`PageRequest`] and renders
//! a single page.

use std::io::Write;

use logiq_core::{LogFilter, LogLevel, Page, PageRequest, RecordStore, Timestamp};
use logiq_core::config::DEFAULT_PAGE_SIZE;

use crate::cli::{PageArgs, SearchCommands};
use crate::error::CliError;
use crate::output::{Listing, OutputFormat};

/// Handler for `list` and `search`.
pub struct QueryCommand<'a, S: RecordStore + ?Sized> {
    store: &'a S,
    page_size: u32,
}

impl<'a, S: RecordStore + ?Sized> QueryCommand<'a, S> {
    /// Creates a new query command handler.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the page size used when `--limit` is omitted.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Lists every record in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid paging, storage failure or output failure.
    pub fn list<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &PageArgs,
    ) -> Result<Listing, CliError> {
        let request = args.to_request(self.page_size)?;
        self.render(out, format, "Logs", &LogFilter::All, request)
    }

    /// Runs a search subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown level, a malformed timestamp, invalid
    /// paging, storage failure or output failure.
    pub fn search<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        command: &SearchCommands,
    ) -> Result<Listing, CliError> {
        let (title, filter, args) = resolve_search(command)?;
        let request = args.to_request(self.page_size)?;
        self.render(out, format, &title, &filter, request)
    }

    /// Fetches one page for `filter`.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub fn fetch(&self, filter: &LogFilter, request: PageRequest) -> Result<Page, CliError> {
        Ok(self.store.fetch(filter, request)?)
    }

    fn render<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        title: &str,
        filter: &LogFilter,
        request: PageRequest,
    ) -> Result<Listing, CliError> {
        let listing = Listing::new(title, self.fetch(filter, request)?);
        format.write(out, &listing)?;
        Ok(listing)
    }
}

/// Heading shown above a page of results for `filter`.
#[must_use]
pub fn title_for(filter: &LogFilter) -> String {
    match filter {
        LogFilter::All => "Logs".to_string(),
        LogFilter::Level { level } => format!("Logs with level = {level}"),
        LogFilter::Message { contains } => format!("Logs with message containing '{contains}'"),
        LogFilter::RootCause { contains } => {
            format!("Logs with root cause containing '{contains}'")
        }
        LogFilter::DateRange { start, end } => format!("Logs from {start} to {end}"),
    }
}

/// Builds a filter from a level selector; `ALL` (any case) matches everything.
///
/// # Errors
///
/// Returns an error for anything other than INFO, WARN, ERROR or ALL.
pub fn level_filter(input: &str) -> Result<(String, LogFilter), CliError> {
    let selector = LogLevel::parse_selector(input)?;
    let filter = LogFilter::level(selector);
    let title = match selector {
        Some(_) => title_for(&filter),
        None => "Logs with level = ALL".to_string(),
    };
    Ok((title, filter))
}

/// Builds an inclusive date-range filter from two timestamps.
///
/// # Errors
///
/// Returns an error if either bound is not `YYYY-MM-DD HH:MM:SS`.
pub fn range_filter(start: &str, end: &str) -> Result<LogFilter, CliError> {
    let start = Timestamp::parse(start.trim())?;
    let end = Timestamp::parse(end.trim())?;
    Ok(LogFilter::date_range(start, end))
}

fn resolve_search(command: &SearchCommands) -> Result<(String, LogFilter, PageArgs), CliError> {
    match command {
        SearchCommands::Level { level, page } => {
            let (title, filter) = level_filter(level)?;
            Ok((title, filter, *page))
        }
        SearchCommands::Message { text, page } => {
            let filter = LogFilter::message(text.as_str());
            Ok((title_for(&filter), filter, *page))
        }
        SearchCommands::RootCause { text, page } => {
            let filter = LogFilter::root_cause(text.as_str());
            Ok((title_for(&filter), filter, *page))
        }
        SearchCommands::Range { start, end, page } => {
            let filter = range_filter(start, end)?;
            Ok((title_for(&filter), filter, *page))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logiq_core::{Classifier, LogError, SqliteStore};

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().expect("store");
        let classifier = Classifier::new();
        let lines = [
            "2025-10-04 15:48:00 ERROR Timeout waiting for db",
            "2025-10-04 15:45:00 INFO System started",
            "2025-10-04 15:46:10 ERROR NullPointer in handler",
            "2025-10-04 15:47:30 WARN Disk usage high",
        ];
        let records: Vec<_> = lines.iter().filter_map(|l| classifier.classify(l)).collect();
        store.insert_batch(&records).expect("insert");
        store
    }

    fn page(limit: i64, page: i64) -> PageArgs {
        PageArgs {
            limit: Some(limit),
            page,
        }
    }

    #[test]
    fn list_pages_through_records() {
        let store = seeded();
        let cmd = QueryCommand::new(&store);
        let mut out = Vec::new();

        let first = cmd.list(&mut out, &OutputFormat::default(), &page(3, 0)).expect("list");
        assert_eq!(first.page.len(), 3);
        let second = cmd.list(&mut out, &OutputFormat::default(), &page(3, 1)).expect("list");
        assert_eq!(second.page.len(), 1);
        assert!(second.page.is_last());
    }

    #[test]
    fn list_uses_configured_page_size() {
        let store = seeded();
        let mut out = Vec::new();
        let listing = QueryCommand::new(&store)
            .with_page_size(2)
            .list(&mut out, &OutputFormat::default(), &PageArgs { limit: None, page: 0 })
            .expect("list");
        assert_eq!(listing.page.len(), 2);
    }

    #[test]
    fn search_level_is_case_insensitive_and_supports_all() {
        let store = seeded();
        let cmd = QueryCommand::new(&store);
        let mut out = Vec::new();

        let errors = cmd
            .search(
                &mut out,
                &OutputFormat::default(),
                &SearchCommands::Level {
                    level: "error".into(),
                    page: page(10, 0),
                },
            )
            .expect("search");
        assert_eq!(errors.page.len(), 2);
        assert_eq!(errors.title, "Logs with level = ERROR");

        let all = cmd
            .search(
                &mut out,
                &OutputFormat::default(),
                &SearchCommands::Level {
                    level: "ALL".into(),
                    page: page(10, 0),
                },
            )
            .expect("search");
        assert_eq!(all.page.len(), 4);
    }

    #[test]
    fn search_unknown_level_is_rejected() {
        let store = seeded();
        let mut out = Vec::new();
        let err = QueryCommand::new(&store).search(
            &mut out,
            &OutputFormat::default(),
            &SearchCommands::Level {
                level: "DEBUG".into(),
                page: page(10, 0),
            },
        );
        assert!(matches!(err, Err(CliError::Core(LogError::InvalidLevel(_)))));
    }

    #[test]
    fn search_range_orders_by_timestamp() {
        let store = seeded();
        let mut out = Vec::new();
        let listing = QueryCommand::new(&store)
            .search(
                &mut out,
                &OutputFormat::default(),
                &SearchCommands::Range {
                    start: "2025-10-04 15:45:00".into(),
                    end: "2025-10-04 15:48:00".into(),
                    page: page(10, 0),
                },
            )
            .expect("search");
        let times: Vec<_> = listing
            .page
            .records
            .iter()
            .map(|r| r.record.timestamp.as_str().to_string())
            .collect();
        assert_eq!(
            times,
            [
                "2025-10-04 15:45:00",
                "2025-10-04 15:46:10",
                "2025-10-04 15:47:30",
                "2025-10-04 15:48:00"
            ]
        );
    }

    #[test]
    fn search_range_rejects_malformed_timestamp() {
        let store = seeded();
        let mut out = Vec::new();
        let err = QueryCommand::new(&store).search(
            &mut out,
            &OutputFormat::default(),
            &SearchCommands::Range {
                start: "2025-10-04".into(),
                end: "2025-10-04 15:48:00".into(),
                page: page(10, 0),
            },
        );
        assert!(matches!(err, Err(CliError::Core(LogError::InvalidQuery(_)))));
    }

    #[test]
    fn search_message_and_root_cause() {
        let store = seeded();
        let cmd = QueryCommand::new(&store);
        let mut out = Vec::new();

        let by_message = cmd
            .search(
                &mut out,
                &OutputFormat::default(),
                &SearchCommands::Message {
                    text: "Disk".into(),
                    page: page(10, 0),
                },
            )
            .expect("search");
        assert_eq!(by_message.page.len(), 1);

        let by_cause = cmd
            .search(
                &mut out,
                &OutputFormat::default(),
                &SearchCommands::RootCause {
                    text: "Null".into(),
                    page: page(10, 0),
                },
            )
            .expect("search");
        assert_eq!(by_cause.page.len(), 1);
        assert_eq!(by_cause.title, "Logs with root cause containing 'Null'");
    }

    #[test]
    fn negative_limit_is_rejected() {
        let store = seeded();
        let mut out = Vec::new();
        let err = QueryCommand::new(&store).list(&mut out, &OutputFormat::default(), &page(-1, 0));
        assert!(matches!(err, Err(CliError::Core(LogError::InvalidQuery(_)))));
        assert!(out.is_empty());
    }
}
