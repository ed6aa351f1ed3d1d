//! Session controller: runs the timer engine against a store.
//!
//! Every operation loads the employee's open session, asks the engine for the
//! next snapshot, and only then writes. A rejected transition therefore never
//! touches the store.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::cache::TtlCache;
use crate::engine;
use crate::session::WorkSession;
use crate::store::{SessionStore, StoreError};
use crate::types::{EmployeeId, SessionId};

/// Caller-visible timer failures.
#[derive(Debug, Error)]
pub enum TimerError {
    #[error("already running")]
    AlreadyRunning,
    #[error("no active timer")]
    NoActiveTimer,
    #[error("already paused")]
    AlreadyPaused,
    #[error("not paused")]
    NotPaused,
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Result of a successful stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopOutcome {
    pub session_id: SessionId,
    pub duration_sec: u64,
}

/// Current timer state for one employee.
///
/// Serializes as `{"active":false}` when no session is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStatus {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paused: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_sec: Option<u64>,
}

impl TimerStatus {
    pub const fn inactive() -> Self {
        Self {
            active: false,
            start_time: None,
            is_paused: None,
            elapsed_sec: None,
        }
    }

    fn of(session: &WorkSession, now: DateTime<Utc>) -> Self {
        Self {
            active: true,
            start_time: Some(session.start_time),
            is_paused: Some(session.is_paused),
            elapsed_sec: Some(engine::live_elapsed(session, now)),
        }
    }
}

/// An open timer in the roster of all employees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTimer {
    pub employee_id: EmployeeId,
    pub start_time: DateTime<Utc>,
    pub is_paused: bool,
    pub elapsed_sec: u64,
}

type StatusCache = TtlCache<EmployeeId, Option<WorkSession>>;

/// Enforces one open session per employee on top of a [`SessionStore`].
///
/// Each operation has a `*_at` variant taking an explicit `now`; the plain
/// variant uses the system clock.
pub struct SessionController<S> {
    store: S,
    status_cache: Option<Mutex<StatusCache>>,
}

impl<S: SessionStore> SessionController<S> {
    pub const fn new(store: S) -> Self {
        Self {
            store,
            status_cache: None,
        }
    }

    /// Caches open-session lookups made by [`get_status`](Self::get_status).
    ///
    /// Mutations made through this controller invalidate the affected
    /// employee's entry. Writes made elsewhere become visible once the entry
    /// expires. A zero `ttl` disables the cache.
    #[must_use]
    pub fn with_status_cache(mut self, ttl: Duration) -> Self {
        self.status_cache = (!ttl.is_zero()).then(|| Mutex::new(TtlCache::new(ttl)));
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn start_session(&self, employee_id: &EmployeeId) -> Result<DateTime<Utc>, TimerError> {
        self.start_session_at(employee_id, Utc::now())
    }

    /// Starts a timer and returns its start time.
    pub fn start_session_at(
        &self,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, TimerError> {
        if self.store.find_open_session(employee_id)?.is_some() {
            tracing::warn!(employee = %employee_id, "start rejected: timer already running");
            return Err(TimerError::AlreadyRunning);
        }

        let session = engine::start(employee_id.clone(), now);
        match self.store.insert(&session) {
            Ok(()) => {}
            Err(StoreError::OpenSessionExists(_)) => {
                tracing::warn!(employee = %employee_id, "start lost race to a concurrent start");
                return Err(TimerError::AlreadyRunning);
            }
            Err(err) => return Err(err.into()),
        }
        self.invalidate_status(employee_id);

        tracing::info!(employee = %employee_id, session = %session.id, "timer started");
        Ok(session.start_time)
    }

    pub fn pause_session(&self, employee_id: &EmployeeId) -> Result<(), TimerError> {
        self.pause_session_at(employee_id, Utc::now())
    }

    pub fn pause_session_at(
        &self,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<(), TimerError> {
        let session = self.open_session(employee_id)?;
        let paused = engine::pause(&session, now).map_err(|err| {
            tracing::warn!(employee = %employee_id, %err, "pause rejected");
            TimerError::AlreadyPaused
        })?;
        self.save(&paused)?;

        tracing::info!(employee = %employee_id, session = %paused.id, "timer paused");
        Ok(())
    }

    pub fn resume_session(&self, employee_id: &EmployeeId) -> Result<(), TimerError> {
        self.resume_session_at(employee_id, Utc::now())
    }

    pub fn resume_session_at(
        &self,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<(), TimerError> {
        let session = self.open_session(employee_id)?;
        let resumed = engine::resume(&session, now).map_err(|err| {
            tracing::warn!(employee = %employee_id, %err, "resume rejected");
            TimerError::NotPaused
        })?;
        self.save(&resumed)?;

        tracing::info!(
            employee = %employee_id,
            session = %resumed.id,
            total_pause_sec = resumed.total_pause_sec,
            "timer resumed"
        );
        Ok(())
    }

    pub fn stop_session(&self, employee_id: &EmployeeId) -> Result<StopOutcome, TimerError> {
        self.stop_session_at(employee_id, Utc::now())
    }

    /// Closes the open timer and returns its net worked time.
    pub fn stop_session_at(
        &self,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<StopOutcome, TimerError> {
        let session = self.open_session(employee_id)?;
        let closed = engine::stop(&session, now).map_err(|err| {
            tracing::warn!(employee = %employee_id, %err, "stop rejected");
            TimerError::NoActiveTimer
        })?;
        self.save(&closed)?;

        let duration_sec = closed.duration_sec.unwrap_or(0);
        tracing::info!(employee = %employee_id, session = %closed.id, duration_sec, "timer stopped");
        Ok(StopOutcome {
            session_id: closed.id,
            duration_sec,
        })
    }

    pub fn get_status(&self, employee_id: &EmployeeId) -> Result<TimerStatus, TimerError> {
        self.get_status_at(employee_id, Utc::now())
    }

    /// Reports whether the employee has an open timer and its live elapsed time.
    pub fn get_status_at(
        &self,
        employee_id: &EmployeeId,
        now: DateTime<Utc>,
    ) -> Result<TimerStatus, TimerError> {
        let session = self.cached_open_session(employee_id)?;
        Ok(session.map_or_else(TimerStatus::inactive, |session| {
            TimerStatus::of(&session, now)
        }))
    }

    /// Lists the employee's sessions, newest first.
    pub fn session_log(
        &self,
        employee_id: &EmployeeId,
        limit: usize,
    ) -> Result<Vec<WorkSession>, TimerError> {
        Ok(self.store.list_sessions(employee_id, limit)?)
    }

    pub fn active_timers(&self) -> Result<Vec<ActiveTimer>, TimerError> {
        self.active_timers_at(Utc::now())
    }

    /// Lists every open timer with its live elapsed time.
    pub fn active_timers_at(&self, now: DateTime<Utc>) -> Result<Vec<ActiveTimer>, TimerError> {
        let timers = self
            .store
            .list_open_sessions()?
            .into_iter()
            .map(|session| ActiveTimer {
                elapsed_sec: engine::live_elapsed(&session, now),
                start_time: session.start_time,
                is_paused: session.is_paused,
                employee_id: session.employee_id,
            })
            .collect();
        Ok(timers)
    }

    fn open_session(&self, employee_id: &EmployeeId) -> Result<WorkSession, TimerError> {
        self.store.find_open_session(employee_id)?.ok_or_else(|| {
            tracing::warn!(employee = %employee_id, "no active timer");
            TimerError::NoActiveTimer
        })
    }

    fn save(&self, session: &WorkSession) -> Result<(), TimerError> {
        let result = self.store.update(session);
        self.invalidate_status(&session.employee_id);
        match result {
            Ok(()) => Ok(()),
            Err(StoreError::SessionClosed(id)) => {
                tracing::warn!(employee = %session.employee_id, session = %id, "session was stopped concurrently");
                Err(TimerError::NoActiveTimer)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn cached_open_session(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<Option<WorkSession>, TimerError> {
        let Some(cache) = &self.status_cache else {
            return Ok(self.store.find_open_session(employee_id)?);
        };

        // Held through the fill so a concurrent invalidation cannot land
        // between the store read and the insert.
        let mut cache = lock(cache);
        if let Some(session) = cache.get(employee_id) {
            tracing::debug!(employee = %employee_id, "status cache hit");
            return Ok(session);
        }

        let session = self.store.find_open_session(employee_id)?;
        cache.sweep();
        cache.insert(employee_id.clone(), session.clone());
        Ok(session)
    }

    fn invalidate_status(&self, employee_id: &EmployeeId) {
        if let Some(cache) = &self.status_cache {
            lock(cache).invalidate(employee_id);
        }
    }
}

fn lock(cache: &Mutex<StatusCache>) -> MutexGuard<'_, StatusCache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}
