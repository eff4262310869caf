use crate::errors::StoreError;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use std::fmt::{self, Debug};
use tracing::info;
use turso::{Connection, Database, Row, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// When cloned, it shares the same underlying database, so one in-memory instance can be
/// handed to several components (e.g. the importer and the HTTP handlers in tests).
#[derive(Clone)]
pub struct SqliteProvider {
    pub db: Database,
}

impl SqliteProvider {
    /// Opens (or creates) the database at `db_path`. Use `":memory:"` for an isolated
    /// in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, StoreError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        // PRAGMA returns a row, so it has to go through `query`.
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Creates the tables and indexes if they are missing. Safe to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        info!("Database schema is ready.");
        Ok(())
    }

    /// Opens a new connection to the shared database.
    pub fn connect(&self) -> Result<Connection, StoreError> {
        self.db
            .connect()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

impl AsRef<Database> for SqliteProvider {
    fn as_ref(&self) -> &Database {
        &self.db
    }
}

// --- Row Decoding ---
//
// Small helpers shared by the article and author stores. Columns are read by position.

pub(crate) fn text_at(row: &Row, idx: usize) -> Result<String, StoreError> {
    match row.get_value(idx)? {
        TursoValue::Text(s) => Ok(s),
        TursoValue::Null => Ok(String::new()),
        other => Err(StoreError::InvalidData(format!(
            "expected text in column {idx}, found {other:?}"
        ))),
    }
}

pub(crate) fn optional_text_at(row: &Row, idx: usize) -> Result<Option<String>, StoreError> {
    match row.get_value(idx)? {
        TursoValue::Text(s) if !s.is_empty() => Ok(Some(s)),
        TursoValue::Text(_) | TursoValue::Null => Ok(None),
        other => Err(StoreError::InvalidData(format!(
            "expected text in column {idx}, found {other:?}"
        ))),
    }
}

pub(crate) fn integer_at(row: &Row, idx: usize) -> Result<i64, StoreError> {
    match row.get_value(idx)? {
        TursoValue::Integer(i) => Ok(i),
        other => Err(StoreError::InvalidData(format!(
            "expected integer in column {idx}, found {other:?}"
        ))),
    }
}

pub(crate) fn u32_at(row: &Row, idx: usize) -> Result<u32, StoreError> {
    let value = integer_at(row, idx)?;
    u32::try_from(value)
        .map_err(|_| StoreError::InvalidData(format!("column {idx} out of range: {value}")))
}

pub(crate) fn date_at(row: &Row, idx: usize) -> Result<Option<NaiveDate>, StoreError> {
    optional_text_at(row, idx)?
        .map(|s| {
            NaiveDate::parse_from_str(&s, DATE_FORMAT)
                .map_err(|e| StoreError::InvalidData(format!("bad date '{s}': {e}")))
        })
        .transpose()
}

pub(crate) fn timestamp_at(row: &Row, idx: usize) -> Result<DateTime<Utc>, StoreError> {
    let raw = text_at(row, idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::InvalidData(format!("bad timestamp '{raw}': {e}")))
}

/// Storage format of calendar dates.
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamps are stored as fixed-width RFC 3339 text so they sort lexicographically.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Maps a unique-constraint failure to `StoreError::Conflict`.
pub(crate) fn conflict_or(err: turso::Error, what: impl FnOnce() -> String) -> StoreError {
    match err {
        turso::Error::SqlExecutionFailure(msg) if msg.contains("UNIQUE constraint failed") => {
            StoreError::Conflict(what())
        }
        other => StoreError::Database(other),
    }
}
