//! Persistence seam for work sessions.
//!
//! # Concurrency
//!
//! [`SessionController::start_session`](crate::SessionController::start_session)
//! checks for an open session and then inserts. Two racing starts can both pass
//! the check, so every store must reject the second insert itself:
//! [`SessionStore::insert`] returns [`StoreError::OpenSessionExists`] when the
//! employee already has an open session. [`MemoryStore`] does this under its
//! lock; the SQLite store relies on a partial unique index.
//!
//! Pause, resume and stop write back a snapshot loaded earlier. Closed sessions
//! are final, so [`SessionStore::update`] refuses to overwrite one and returns
//! [`StoreError::SessionClosed`] instead of reopening it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::session::WorkSession;
use crate::types::{EmployeeId, SessionId};

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The employee already has an open session.
    #[error("employee {0} already has an open session")]
    OpenSessionExists(EmployeeId),
    /// An update targeted a session that is not stored.
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    /// An update targeted a session that was already closed.
    #[error("session already closed: {0}")]
    SessionClosed(SessionId),
    /// Any other backend failure. The cause is kept for logging.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Durable record of work sessions.
pub trait SessionStore {
    /// Returns the employee's open session, if any.
    fn find_open_session(&self, employee_id: &EmployeeId)
    -> Result<Option<WorkSession>, StoreError>;

    /// Stores a new session.
    fn insert(&self, session: &WorkSession) -> Result<(), StoreError>;

    /// Replaces a stored open session, matched by ID.
    ///
    /// Fails with [`StoreError::SessionClosed`] if the stored row is closed.
    fn update(&self, session: &WorkSession) -> Result<(), StoreError>;

    /// Lists an employee's sessions, newest start first.
    fn list_sessions(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<WorkSession>, StoreError>;

    /// Lists open sessions across all employees, newest start first.
    fn list_open_sessions(&self) -> Result<Vec<WorkSession>, StoreError>;
}

/// In-process store backed by a `Vec`.
///
/// Safe to share between threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sessions: Mutex<Vec<WorkSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, Vec<WorkSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn newest_first(sessions: &mut [WorkSession]) {
    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time).then_with(|| a.id.cmp(&b.id)));
}

impl SessionStore for MemoryStore {
    fn find_open_session(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<WorkSession>, StoreError> {
        Ok(self
            .sessions()
            .iter()
            .find(|s| s.is_open() && &s.employee_id == employee_id)
            .cloned())
    }

    fn insert(&self, session: &WorkSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions();
        if session.is_open()
            && sessions
                .iter()
                .any(|s| s.is_open() && s.employee_id == session.employee_id)
        {
            return Err(StoreError::OpenSessionExists(session.employee_id.clone()));
        }
        sessions.push(session.clone());
        Ok(())
    }

    fn update(&self, session: &WorkSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions();
        let stored = sessions
            .iter_mut()
            .find(|s| s.id == session.id)
            .ok_or_else(|| StoreError::SessionNotFound(session.id.clone()))?;
        if !stored.is_open() {
            return Err(StoreError::SessionClosed(session.id.clone()));
        }
        *stored = session.clone();
        Ok(())
    }

    fn list_sessions(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<WorkSession>, StoreError> {
        let mut sessions: Vec<_> = self
            .sessions()
            .iter()
            .filter(|s| &s.employee_id == employee_id)
            .cloned()
            .collect();
        newest_first(&mut sessions);
        sessions.truncate(limit);
        Ok(sessions)
    }

    fn list_open_sessions(&self) -> Result<Vec<WorkSession>, StoreError> {
        let mut sessions: Vec<_> = self
            .sessions()
            .iter()
            .filter(|s| s.is_open())
            .cloned()
            .collect();
        newest_first(&mut sessions);
        Ok(sessions)
    }
}
