mod blacklist;
mod clips;
mod favorites;
mod schema;
mod summary;

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction};
use thiserror::Error;

use crate::models::ContentType;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database lock poisoned")]
    LockPoisoned,
    #[error("deadline passed before the work could commit")]
    DeadlineElapsed,
    #[error("favorite {id} cannot be relinked to other content")]
    FavoriteRelinked { id: i64 },
}

/// Single SQLite connection shared by every caller; statements queue on the mutex.
///
/// A handle made by [`Database::with_deadline`] refuses to start or commit
/// work once its deadline has passed.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    deadline: Option<Instant>,
}

impl Database {
    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        let conn = self.conn.lock().map_err(|_| DbError::LockPoisoned)?;
        self.check_deadline()?;
        Ok(conn)
    }

    fn check_deadline(&self) -> Result<(), DbError> {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(DbError::DeadlineElapsed),
            _ => Ok(()),
        }
    }

    /// Handle on the same connection bounded by `deadline`; `None` means unbounded.
    pub fn with_deadline(&self, deadline: Option<Instant>) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
            deadline,
        }
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            deadline: None,
        }
    }

    pub fn new(path: &Path, busy_timeout: Duration) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::initialize(&conn)?;
        Ok(Self::from_connection(conn))
    }

    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;
        Ok(Self::from_connection(conn))
    }

    fn initialize(conn: &Connection) -> Result<(), DbError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        for statement in schema::ALL {
            conn.execute_batch(statement)?;
        }
        Ok(())
    }

    /// Runs `work` inside one transaction. Returning an error, panicking, or
    /// overrunning the deadline drops the transaction and rolls every statement back.
    pub fn unit_of_work<T>(
        &self,
        work: impl FnOnce(&mut Transaction<'_>) -> Result<T, DbError>,
    ) -> Result<T, DbError> {
        let mut conn = self.conn()?;
        let mut tx = conn.transaction()?;
        let value = work(&mut tx)?;
        self.check_deadline()?;
        tx.commit()?;
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn execute_batch(&self, sql: &str) -> Result<(), DbError> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn count_rows(&self, table: &str) -> Result<i64, DbError> {
        let conn = self.conn()?;
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count)
    }
}

pub(crate) fn clip_table(kind: ContentType) -> &'static str {
    match kind {
        ContentType::Text => "clip_text",
        ContentType::Image => "clip_image",
        ContentType::File => "clip_file",
    }
}

pub(crate) fn favorite_content_table(kind: ContentType) -> &'static str {
    match kind {
        ContentType::Text => "favorite_content_text",
        ContentType::Image => "favorite_content_image",
        ContentType::File => "favorite_content_file",
    }
}

pub(crate) fn to_micros(timestamp: &DateTime<Utc>) -> i64 {
    timestamp.timestamp_micros()
}

pub(crate) fn from_micros(column: usize, micros: i64) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::from_timestamp_micros(micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, micros))
}
