//! Storage layer for the work session timer.
//!
//! Provides a [`SessionStore`] backed by `rusqlite`, plus persistence for work
//! reports.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but not `Sync`.
//! A `Database` instance can be moved between threads but cannot be shared
//! across threads without external synchronization. Several `Database`
//! instances may open the same file; a busy timeout makes concurrent writers
//! wait for each other instead of failing.
//!
//! # Schema
//!
//! ## One open session per employee
//!
//! `idx_work_sessions_open` is a partial unique index over `employee_id` for
//! rows whose `end_time` is NULL. Two racing starts for the same employee can
//! both pass the controller's lookup, but only one insert survives the index;
//! the other surfaces as [`StoreError::OpenSessionExists`].
//!
//! ## Timestamp Format
//!
//! Timestamps are stored as TEXT in ISO 8601 format with millisecond precision
//! (e.g., `2026-01-15T09:00:00.000Z`), so lexicographic ordering matches
//! chronological ordering.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;
use wt_core::{
    EmployeeId, ReportId, ReportType, SessionId, SessionStore, StoreError, WorkReport, WorkSession,
};

/// How long a writer waits for another connection's lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SESSION_COLUMNS: &str = "id, employee_id, start_time, end_time, is_paused, pause_start_time, total_pause_sec, duration_sec";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp for {row_id}: {timestamp}")]
    TimestampParse {
        row_id: String,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored or supplied value does not fit the domain model.
    #[error("invalid {column} for {row_id}: {message}")]
    InvalidValue {
        row_id: String,
        column: &'static str,
        message: String,
    },
    /// The employee already has an open session.
    #[error("employee {0} already has an open session")]
    OpenSessionExists(EmployeeId),
    /// No stored session has this ID.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    /// The stored session is already closed.
    #[error("session already closed: {0}")]
    SessionClosed(SessionId),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::OpenSessionExists(employee_id) => Self::OpenSessionExists(employee_id),
            DbError::SessionNotFound(session_id) => Self::SessionNotFound(session_id),
            DbError::SessionClosed(session_id) => Self::SessionClosed(session_id),
            other => Self::Backend(Box::new(other)),
        }
    }
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

/// A `work_sessions` row before validation.
struct SessionRow {
    id: String,
    employee_id: String,
    start_time: String,
    end_time: Option<String>,
    is_paused: bool,
    pause_start_time: Option<String>,
    total_pause_sec: i64,
    duration_sec: Option<i64>,
}

impl SessionRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            employee_id: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            is_paused: row.get(4)?,
            pause_start_time: row.get(5)?,
            total_pause_sec: row.get(6)?,
            duration_sec: row.get(7)?,
        })
    }

    fn into_session(self) -> Result<WorkSession, DbError> {
        let id = &self.id;
        let session = WorkSession {
            id: parse_id(SessionId::new(id.as_str()), id, "id")?,
            employee_id: parse_id(EmployeeId::new(self.employee_id), id, "employee_id")?,
            start_time: parse_timestamp(&self.start_time, id)?,
            end_time: self
                .end_time
                .as_deref()
                .map(|t| parse_timestamp(t, id))
                .transpose()?,
            is_paused: self.is_paused,
            pause_start_time: self
                .pause_start_time
                .as_deref()
                .map(|t| parse_timestamp(t, id))
                .transpose()?,
            total_pause_sec: to_unsigned(self.total_pause_sec, id, "total_pause_sec")?,
            duration_sec: self
                .duration_sec
                .map(|d| to_unsigned(d, id, "duration_sec"))
                .transpose()?,
        };

        if session.is_paused != session.pause_start_time.is_some() {
            return Err(DbError::InvalidValue {
                row_id: self.id,
                column: "pause_start_time",
                message: "must be set exactly when the session is paused".to_string(),
            });
        }
        if session.is_open() == session.duration_sec.is_some() {
            return Err(DbError::InvalidValue {
                row_id: self.id,
                column: "duration_sec",
                message: "must be set exactly when the session is closed".to_string(),
            });
        }
        Ok(session)
    }
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.busy_timeout(BUSY_TIMEOUT)?;
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        self.conn.execute_batch(
            "
            -- One row per timer instance.
            -- end_time and duration_sec are NULL while the session is open.
            CREATE TABLE IF NOT EXISTS work_sessions (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT,
                is_paused INTEGER NOT NULL DEFAULT 0,
                pause_start_time TEXT,
                total_pause_sec INTEGER NOT NULL DEFAULT 0 CHECK (total_pause_sec >= 0),
                duration_sec INTEGER CHECK (duration_sec >= 0)
            );

            CREATE INDEX IF NOT EXISTS idx_work_sessions_employee_start
                ON work_sessions(employee_id, start_time);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_work_sessions_open
                ON work_sessions(employee_id) WHERE end_time IS NULL;

            CREATE TABLE IF NOT EXISTS work_reports (
                id TEXT PRIMARY KEY,
                employee_id TEXT NOT NULL,
                session_id TEXT,
                report_type TEXT NOT NULL,
                content TEXT NOT NULL,
                submitted_at TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES work_sessions(id) ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_work_reports_employee
                ON work_reports(employee_id, submitted_at);
            ",
        )?;
        Ok(())
    }

    /// Returns the employee's open session, if any.
    pub fn open_session(&self, employee_id: &EmployeeId) -> Result<Option<WorkSession>, DbError> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT {SESSION_COLUMNS} FROM work_sessions
                     WHERE employee_id = ? AND end_time IS NULL"
                ),
                [employee_id.as_str()],
                SessionRow::from_row,
            )
            .optional()?;
        row.map(SessionRow::into_session).transpose()
    }

    /// Inserts a new session.
    ///
    /// Fails with [`DbError::OpenSessionExists`] if the session is open and the
    /// employee already has another open session.
    pub fn insert_session(&self, session: &WorkSession) -> Result<(), DbError> {
        let id = session.id.as_str();
        let result = self.conn.execute(
            "
            INSERT INTO work_sessions
            (id, employee_id, start_time, end_time, is_paused, pause_start_time, total_pause_sec, duration_sec)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ",
            params![
                id,
                session.employee_id.as_str(),
                format_timestamp(session.start_time),
                session.end_time.map(format_timestamp),
                session.is_paused,
                session.pause_start_time.map(format_timestamp),
                to_signed(session.total_pause_sec, id, "total_pause_sec")?,
                session
                    .duration_sec
                    .map(|d| to_signed(d, id, "duration_sec"))
                    .transpose()?,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                tracing::debug!(employee = %session.employee_id, "open session index rejected insert");
                Err(DbError::OpenSessionExists(session.employee_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Overwrites the mutable columns of a stored open session.
    ///
    /// A row closed by another connection is left untouched and reported as
    /// [`DbError::SessionClosed`].
    pub fn update_session(&self, session: &WorkSession) -> Result<(), DbError> {
        let id = session.id.as_str();
        let changed = self.conn.execute(
            "
            UPDATE work_sessions
            SET end_time = ?, is_paused = ?, pause_start_time = ?, total_pause_sec = ?, duration_sec = ?
            WHERE id = ? AND end_time IS NULL
            ",
            params![
                session.end_time.map(format_timestamp),
                session.is_paused,
                session.pause_start_time.map(format_timestamp),
                to_signed(session.total_pause_sec, id, "total_pause_sec")?,
                session
                    .duration_sec
                    .map(|d| to_signed(d, id, "duration_sec"))
                    .transpose()?,
                id,
            ],
        )?;
        if changed == 0 {
            let exists = self
                .conn
                .query_row("SELECT 1 FROM work_sessions WHERE id = ?", [id], |_| Ok(()))
                .optional()?
                .is_some();
            return Err(if exists {
                DbError::SessionClosed(session.id.clone())
            } else {
                DbError::SessionNotFound(session.id.clone())
            });
        }
        Ok(())
    }

    /// Lists an employee's sessions, newest start first.
    pub fn list_employee_sessions(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<WorkSession>, DbError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions
             WHERE employee_id = ?
             ORDER BY start_time DESC, id ASC
             LIMIT ?"
        ))?;
        let rows = stmt.query_map(params![employee_id.as_str(), limit], SessionRow::from_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    /// Lists all open sessions, newest start first.
    pub fn list_all_open_sessions(&self) -> Result<Vec<WorkSession>, DbError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SESSION_COLUMNS} FROM work_sessions
             WHERE end_time IS NULL
             ORDER BY start_time DESC, id ASC"
        ))?;
        let rows = stmt.query_map([], SessionRow::from_row)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?.into_session()?);
        }
        Ok(sessions)
    }

    /// Stores a work report.
    pub fn insert_report(&self, report: &WorkReport) -> Result<(), DbError> {
        self.conn.execute(
            "
            INSERT INTO work_reports (id, employee_id, session_id, report_type, content, submitted_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
            params![
                report.id.as_str(),
                report.employee_id.as_str(),
                report.session_id.as_ref().map(SessionId::as_str),
                report.report_type.as_str(),
                report.content,
                format_timestamp(report.submitted_at),
            ],
        )?;
        Ok(())
    }

    /// Lists an employee's reports, newest first.
    pub fn list_reports(&self, employee_id: &EmployeeId) -> Result<Vec<WorkReport>, DbError> {
        let mut stmt = self.conn.prepare(
            "
            SELECT id, employee_id, session_id, report_type, content, submitted_at
            FROM work_reports
            WHERE employee_id = ?
            ORDER BY submitted_at DESC, id ASC
            ",
        )?;
        let rows = stmt.query_map([employee_id.as_str()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut reports = Vec::new();
        for row in rows {
            let (id, employee_id, session_id, report_type, content, submitted_at) = row?;
            let report_type: ReportType =
                report_type.parse().map_err(|err| DbError::InvalidValue {
                    row_id: id.clone(),
                    column: "report_type",
                    message: format!("{err}"),
                })?;
            reports.push(WorkReport {
                employee_id: parse_id(EmployeeId::new(employee_id), &id, "employee_id")?,
                session_id: session_id
                    .map(|s| parse_id(SessionId::new(s), &id, "session_id"))
                    .transpose()?,
                report_type,
                content,
                submitted_at: parse_timestamp(&submitted_at, &id)?,
                id: parse_id(ReportId::new(id.as_str()), &id, "id")?,
            });
        }
        Ok(reports)
    }
}

impl SessionStore for Database {
    fn find_open_session(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<WorkSession>, StoreError> {
        Ok(self.open_session(employee_id)?)
    }

    fn insert(&self, session: &WorkSession) -> Result<(), StoreError> {
        Ok(self.insert_session(session)?)
    }

    fn update(&self, session: &WorkSession) -> Result<(), StoreError> {
        Ok(self.update_session(session)?)
    }

    fn list_sessions(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<WorkSession>, StoreError> {
        Ok(self.list_employee_sessions(employee_id, limit)?)
    }

    fn list_open_sessions(&self) -> Result<Vec<WorkSession>, StoreError> {
        Ok(self.list_all_open_sessions()?)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_id<T>(
    parsed: Result<T, wt_core::ValidationError>,
    row_id: &str,
    column: &'static str,
) -> Result<T, DbError> {
    parsed.map_err(|err| DbError::InvalidValue {
        row_id: row_id.to_string(),
        column,
        message: err.to_string(),
    })
}

fn parse_timestamp(timestamp: &str, row_id: &str) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            row_id: row_id.to_string(),
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn to_signed(value: u64, row_id: &str, column: &'static str) -> Result<i64, DbError> {
    i64::try_from(value).map_err(|_| DbError::InvalidValue {
        row_id: row_id.to_string(),
        column,
        message: format!("{value} does not fit in an INTEGER column"),
    })
}

fn to_unsigned(value: i64, row_id: &str, column: &'static str) -> Result<u64, DbError> {
    u64::try_from(value).map_err(|_| DbError::InvalidValue {
        row_id: row_id.to_string(),
        column,
        message: format!("{value} is negative"),
    })
}
