//! Work sessions - one timer instance per row.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, SessionId};

/// Lifecycle state of a work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Open and accumulating worked time.
    Running,
    /// Open, with a pause interval in progress.
    Paused,
    /// Stopped; `duration_sec` is fixed.
    Closed,
}

impl SessionState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single timer instance for one employee.
///
/// At most one session per employee may be open (`end_time` is `None`) at a
/// time. That invariant is enforced by the controller together with the
/// store; a `WorkSession` value on its own knows nothing about its siblings.
///
/// `pause_start_time` is `Some` exactly when `is_paused` is true, and
/// `duration_sec` is `Some` exactly when the session is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSession {
    pub id: SessionId,
    pub employee_id: EmployeeId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_paused: bool,
    pub pause_start_time: Option<DateTime<Utc>>,
    /// Sum of all completed pause intervals, in whole seconds.
    pub total_pause_sec: u64,
    /// Net worked time, set once on stop.
    pub duration_sec: Option<u64>,
}

impl WorkSession {
    /// Creates a new running session.
    pub const fn new(id: SessionId, employee_id: EmployeeId, start_time: DateTime<Utc>) -> Self {
        Self {
            id,
            employee_id,
            start_time,
            end_time: None,
            is_paused: false,
            pause_start_time: None,
            total_pause_sec: 0,
            duration_sec: None,
        }
    }

    /// Returns the lifecycle state derived from the stored fields.
    pub const fn state(&self) -> SessionState {
        if self.end_time.is_some() {
            SessionState::Closed
        } else if self.is_paused {
            SessionState::Paused
        } else {
            SessionState::Running
        }
    }

    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}
