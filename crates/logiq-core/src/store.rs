//! SQLite-backed record storage.
//!
//! This module provides:
//! - [`SqliteStore`] — Deduplicating, paginated storage behind a single connection
//! - Implementation of [`RecordStore`] for generic usage
//!
//! Every call locks the one connection for its whole duration, so a batch
//! insert never interleaves with another write.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, Value, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};
use tracing::{debug, info};

use crate::config::LogiqConfig;
use crate::error::{LogError, Result};
use crate::traits::RecordStore;
use crate::types::{
    BatchReport, InsertOutcome, LogFilter, LogId, LogLevel, LogRecord, Page, PageRequest,
    RootCause, RootCauseCount, StoredRecord, Summary, Timestamp,
};

/// Records staged per transaction during batch inserts.
pub const DEFAULT_BATCH_SIZE: usize = 100;

// `root_cause` is nullable, and SQLite treats NULLs as distinct in UNIQUE
// constraints, so the identity index folds NULL to ''.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS logs (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp   TEXT NOT NULL,
        level       TEXT NOT NULL CHECK (level IN ('INFO', 'WARN', 'ERROR')),
        message     TEXT NOT NULL,
        root_cause  TEXT
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_logs_identity
        ON logs (timestamp, level, message, IFNULL(root_cause, ''));

    CREATE INDEX IF NOT EXISTS idx_logs_timestamp ON logs (timestamp);
";

const INSERT_SQL: &str = "
    INSERT INTO logs (timestamp, level, message, root_cause)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT DO NOTHING
";

const SELECT_COLUMNS: &str = "SELECT id, timestamp, level, message, root_cause FROM logs";

const ORDER_BY_ID: &str = "ORDER BY id ASC";
const ORDER_BY_TIMESTAMP: &str = "ORDER BY timestamp ASC, id ASC";

/// Deduplicating record store on top of SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    batch_size: usize,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path` and ensures the schema.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the database
    /// cannot be opened or the schema cannot be set up.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| LogError::StorageSetup {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
            batch_size: DEFAULT_BATCH_SIZE,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Opens a private in-memory database with the schema in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be set up.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: None,
            batch_size: DEFAULT_BATCH_SIZE,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Opens the database named by the configuration, using its batch size.
    ///
    /// # Errors
    ///
    /// Returns an error if opening fails.
    pub fn open_with_config(config: &LogiqConfig) -> Result<Self> {
        Ok(Self::open(&config.database_path)?.with_batch_size(config.batch_size))
    }

    /// Sets how many records each batch transaction holds (at least one).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Records staged per transaction.
    #[must_use]
    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Location of the database file, or `None` when in memory.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl RecordStore for SqliteStore {
    fn ensure_schema(&self) -> Result<()> {
        self.conn.lock().execute_batch(SCHEMA)?;
        info!(path = ?self.path, "log schema ready");
        Ok(())
    }

    fn insert_one(&self, record: &LogRecord) -> Result<InsertOutcome> {
        let conn = self.conn.lock();
        let outcome = insert_record(&conn, record)?;
        debug!(?outcome, timestamp = %record.timestamp, level = %record.level, "insert");
        Ok(outcome)
    }

    fn insert_batch(&self, records: &[LogRecord]) -> Result<BatchReport> {
        let mut conn = self.conn.lock();
        let mut report = BatchReport::default();

        for chunk in records.chunks(self.batch_size) {
            let tx = conn.transaction()?;
            for record in chunk {
                report.record(insert_record(&tx, record)?);
            }
            tx.commit()?;
            debug!(
                staged = chunk.len(),
                inserted = report.inserted,
                duplicates = report.duplicates,
                "flushed batch"
            );
        }

        Ok(report)
    }

    fn fetch(&self, filter: &LogFilter, page: PageRequest) -> Result<Page> {
        if page.limit() == 0 {
            return Ok(Page::empty(page));
        }

        let (predicate, order, mut bindings) = query_parts(filter);
        bindings.push(Value::Integer(to_sql_int(page.limit())));
        bindings.push(Value::Integer(to_sql_int(page.offset())));
        let sql = format!("{SELECT_COLUMNS} {predicate} {order} LIMIT ? OFFSET ?");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let records = stmt
            .query_map(params_from_iter(bindings.iter()), stored_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(
            ?filter,
            limit = page.limit(),
            offset = page.offset(),
            rows = records.len(),
            "fetched page"
        );
        Ok(Page {
            records,
            request: page,
        })
    }

    fn get(&self, id: LogId) -> Result<Option<StoredRecord>> {
        let conn = self.conn.lock();
        let record = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                params![id.0],
                stored_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn count(&self) -> Result<u64> {
        let conn = self.conn.lock();
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;
        Ok(total as u64)
    }

    fn summarize(&self) -> Result<Summary> {
        let conn = self.conn.lock();

        let total: i64 = conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))?;

        let mut by_level_stmt = conn.prepare("SELECT level, COUNT(*) FROM logs GROUP BY level")?;
        let by_level = by_level_stmt
            .query_map([], |row| {
                Ok((row.get::<_, LogLevel>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        // Ties on count are ordered by name; callers must not rely on it.
        let mut causes_stmt = conn.prepare(
            "SELECT root_cause, COUNT(*) AS cnt FROM logs
             WHERE root_cause IS NOT NULL
             GROUP BY root_cause
             ORDER BY cnt DESC, root_cause ASC
             LIMIT ?1",
        )?;
        let top_root_causes = causes_stmt
            .query_map(params![Summary::TOP_ROOT_CAUSES as i64], |row| {
                Ok(RootCauseCount {
                    cause: row.get(0)?,
                    count: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Summary {
            total: total as u64,
            by_level,
            top_root_causes,
        })
    }
}

fn insert_record(conn: &Connection, record: &LogRecord) -> rusqlite::Result<InsertOutcome> {
    let mut stmt = conn.prepare_cached(INSERT_SQL)?;
    let changed = stmt.execute(params![
        record.timestamp,
        record.level,
        record.message,
        record.root_cause,
    ])?;

    if changed == 0 {
        Ok(InsertOutcome::Duplicate)
    } else {
        Ok(InsertOutcome::Inserted(LogId(conn.last_insert_rowid())))
    }
}

/// Translates a filter into a predicate, an ordering and its bindings.
///
/// Substring matches use `instr`, which is case-sensitive and has no
/// wildcard characters, unlike `LIKE`.
fn query_parts(filter: &LogFilter) -> (&'static str, &'static str, Vec<Value>) {
    let order = if filter.orders_by_timestamp() {
        ORDER_BY_TIMESTAMP
    } else {
        ORDER_BY_ID
    };
    let (predicate, bindings) = match filter {
        LogFilter::All => ("", Vec::new()),
        LogFilter::Level { level } => (
            "WHERE level = ?",
            vec![Value::Text(level.as_str().to_string())],
        ),
        LogFilter::Message { contains } => (
            "WHERE instr(message, ?) > 0",
            vec![Value::Text(contains.clone())],
        ),
        LogFilter::RootCause { contains } => (
            "WHERE instr(root_cause, ?) > 0",
            vec![Value::Text(contains.clone())],
        ),
        LogFilter::DateRange { start, end } => (
            "WHERE timestamp >= ? AND timestamp <= ?",
            vec![
                Value::Text(start.as_str().to_string()),
                Value::Text(end.as_str().to_string()),
            ],
        ),
    };
    (predicate, order, bindings)
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn stored_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    Ok(StoredRecord {
        id: LogId(row.get(0)?),
        record: LogRecord {
            timestamp: row.get(1)?,
            level: row.get(2)?,
            message: row.get(3)?,
            root_cause: row.get(4)?,
        },
    })
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(Self::from_matched)
    }
}

impl ToSql for LogLevel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for LogLevel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LogError| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for RootCause {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for RootCause {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LogError| FromSqlError::Other(Box::new(e)))
    }
}
