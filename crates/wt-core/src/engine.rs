//! Timer engine: pure state transitions and elapsed-time arithmetic.
//!
//! Every function takes a session snapshot plus the current wall-clock time
//! and returns either an updated snapshot or an [`EngineError`]. Nothing here
//! performs I/O; persisting the result is the caller's job.
//!
//! # Time arithmetic
//!
//! All durations are whole seconds. Sub-second differences are truncated,
//! never rounded, and every derived duration is clamped at zero so clock skew
//! cannot produce a negative worked time.
//!
//! # Pauses
//!
//! Pausing only records `pause_start_time`. The pause interval is folded into
//! `total_pause_sec` when the pause ends, either by [`resume`] or by [`stop`].
//! Stopping a paused session is equivalent to resuming and stopping at the
//! same instant.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::session::{SessionState, WorkSession};
use crate::types::{EmployeeId, SessionId};

/// A state-changing timer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Pause,
    Resume,
    Stop,
}

impl Operation {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected transitions.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// The operation is not a legal edge from the session's current state.
    #[error("cannot {operation} a {state} session")]
    InvalidState {
        operation: Operation,
        state: SessionState,
    },
}

/// Starts a new running session for `employee_id`.
///
/// Does not check for an existing open session; see
/// [`SessionController`](crate::SessionController) for that.
pub fn start(employee_id: EmployeeId, now: DateTime<Utc>) -> WorkSession {
    WorkSession::new(SessionId::generate(), employee_id, now)
}

/// Pauses a running session.
pub fn pause(session: &WorkSession, now: DateTime<Utc>) -> Result<WorkSession, EngineError> {
    require_state(session, Operation::Pause, SessionState::Running)?;
    let mut next = session.clone();
    next.is_paused = true;
    next.pause_start_time = Some(now);
    Ok(next)
}

/// Resumes a paused session, folding the pause interval into `total_pause_sec`.
pub fn resume(session: &WorkSession, now: DateTime<Utc>) -> Result<WorkSession, EngineError> {
    require_state(session, Operation::Resume, SessionState::Paused)?;
    let mut next = session.clone();
    fold_in_pause(&mut next, now);
    Ok(next)
}

/// Closes an open session and fixes its `duration_sec`.
///
/// A paused session has its open pause interval folded in first.
pub fn stop(session: &WorkSession, now: DateTime<Utc>) -> Result<WorkSession, EngineError> {
    let state = session.state();
    if state == SessionState::Closed {
        return Err(EngineError::InvalidState {
            operation: Operation::Stop,
            state,
        });
    }

    let mut next = session.clone();
    if state == SessionState::Paused {
        fold_in_pause(&mut next, now);
    }
    next.end_time = Some(now);
    next.duration_sec = Some(net_seconds(
        whole_seconds(next.start_time, now),
        next.total_pause_sec,
    ));
    Ok(next)
}

/// Worked seconds for display.
///
/// Closed sessions report their fixed `duration_sec`. A paused session reports
/// the worked time up to the moment it was paused, so the value holds still for
/// as long as the pause lasts. A running session counts up to `now`.
pub fn live_elapsed(session: &WorkSession, now: DateTime<Utc>) -> u64 {
    match session.state() {
        SessionState::Closed => session.duration_sec.unwrap_or(0),
        SessionState::Paused => {
            let paused_at = session.pause_start_time.unwrap_or(now);
            net_seconds(
                whole_seconds(session.start_time, paused_at),
                session.total_pause_sec,
            )
        }
        SessionState::Running => net_seconds(
            whole_seconds(session.start_time, now),
            session.total_pause_sec,
        ),
    }
}

fn require_state(
    session: &WorkSession,
    operation: Operation,
    expected: SessionState,
) -> Result<(), EngineError> {
    let state = session.state();
    if state == expected {
        Ok(())
    } else {
        Err(EngineError::InvalidState { operation, state })
    }
}

fn fold_in_pause(session: &mut WorkSession, now: DateTime<Utc>) {
    let delta = session
        .pause_start_time
        .map_or(0, |paused_at| clamp_seconds(whole_seconds(paused_at, now)));
    session.total_pause_sec = session.total_pause_sec.saturating_add(delta);
    session.is_paused = false;
    session.pause_start_time = None;
}

/// Signed whole seconds from `from` to `to`, truncated toward zero.
fn whole_seconds(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_seconds()
}

fn clamp_seconds(seconds: i64) -> u64 {
    u64::try_from(seconds).unwrap_or(0)
}

fn net_seconds(elapsed: i64, paused: u64) -> u64 {
    let paused = i64::try_from(paused).unwrap_or(i64::MAX);
    clamp_seconds(elapsed.saturating_sub(paused))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, TimeZone};

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn started() -> WorkSession {
        start(EmployeeId::new("emp-1").unwrap(), t(0))
    }

    #[test]
    fn start_creates_running_session() {
        let session = started();
        assert_eq!(session.start_time, t(0));
        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.total_pause_sec, 0);
        assert_eq!(session.end_time, None);
        assert_eq!(session.duration_sec, None);
    }

    #[test]
    fn stop_without_pauses_counts_wall_time() {
        let stopped = stop(&started(), t(100)).unwrap();
        assert_eq!(stopped.end_time, Some(t(100)));
        assert_eq!(stopped.duration_sec, Some(100));
        assert_eq!(stopped.state(), SessionState::Closed);
    }

    #[test]
    fn pause_resume_stop_subtracts_pause() {
        let session = pause(&started(), t(30)).unwrap();
        assert_eq!(session.total_pause_sec, 0, "pause alone does not accumulate");
        let session = resume(&session, t(50)).unwrap();
        assert_eq!(session.total_pause_sec, 20);
        assert!(!session.is_paused);
        assert_eq!(session.pause_start_time, None);
        let session = stop(&session, t(80)).unwrap();
        assert_eq!(session.total_pause_sec, 20);
        assert_eq!(session.duration_sec, Some(60));
    }

    #[test]
    fn stop_while_paused_folds_in_open_pause() {
        let session = pause(&started(), t(10)).unwrap();
        let stopped = stop(&session, t(40)).unwrap();
        assert_eq!(stopped.total_pause_sec, 30);
        assert_eq!(stopped.duration_sec, Some(10));
        assert!(!stopped.is_paused);
        assert_eq!(stopped.pause_start_time, None);
    }

    #[test]
    fn stop_while_paused_matches_resume_then_stop() {
        let session = resume(&pause(&started(), t(5)).unwrap(), t(9)).unwrap();
        let paused = pause(&session, t(70)).unwrap();

        let direct = stop(&paused, t(130)).unwrap();
        let via_resume = stop(&resume(&paused, t(130)).unwrap(), t(130)).unwrap();

        assert_eq!(direct, via_resume);
        assert_eq!(direct.duration_sec, Some(130 - 4 - 60));
    }

    #[test]
    fn pause_twice_is_rejected_without_change() {
        let once = pause(&started(), t(10)).unwrap();
        let err = pause(&once, t(20)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidState {
                operation: Operation::Pause,
                state: SessionState::Paused,
            }
        );
        assert_eq!(once.pause_start_time, Some(t(10)));
    }

    #[test]
    fn resume_requires_pause() {
        let err = resume(&started(), t(10)).unwrap_err();
        assert_eq!(err.to_string(), "cannot resume a running session");
    }

    #[test]
    fn closed_sessions_reject_everything() {
        let closed = stop(&started(), t(10)).unwrap();
        for result in [
            pause(&closed, t(20)),
            resume(&closed, t(20)),
            stop(&closed, t(20)),
        ] {
            assert!(matches!(
                result,
                Err(EngineError::InvalidState {
                    state: SessionState::Closed,
                    ..
                })
            ));
        }
    }

    #[test]
    fn sub_second_differences_are_truncated() {
        let session = started();
        let stopped = stop(&session, t(59) + Duration::milliseconds(999)).unwrap();
        assert_eq!(stopped.duration_sec, Some(59));

        let paused = pause(&session, t(10)).unwrap();
        let resumed = resume(&paused, t(12) + Duration::milliseconds(900)).unwrap();
        assert_eq!(resumed.total_pause_sec, 2);
    }

    #[test]
    fn resume_before_pause_start_adds_nothing() {
        let paused = pause(&started(), t(50)).unwrap();
        let resumed = resume(&paused, t(40)).unwrap();
        assert_eq!(resumed.total_pause_sec, 0);
    }

    #[test]
    fn stop_before_start_clamps_to_zero() {
        let stopped = stop(&started(), t(-30)).unwrap();
        assert_eq!(stopped.duration_sec, Some(0));
    }

    #[test]
    fn live_elapsed_running_counts_up() {
        let session = resume(&pause(&started(), t(10)).unwrap(), t(25)).unwrap();
        assert_eq!(live_elapsed(&session, t(100)), 85);
    }

    #[test]
    fn live_elapsed_is_frozen_while_paused() {
        let running = started();
        let before_pause = live_elapsed(&running, t(30));
        let paused = pause(&running, t(30)).unwrap();

        assert_eq!(live_elapsed(&paused, t(30)), before_pause);
        assert_eq!(live_elapsed(&paused, t(31)), before_pause);
        assert_eq!(live_elapsed(&paused, t(3_600)), before_pause);
    }

    #[test]
    fn live_elapsed_closed_reports_duration() {
        let closed = stop(&started(), t(42)).unwrap();
        assert_eq!(live_elapsed(&closed, t(10_000)), 42);
    }

    #[test]
    fn live_elapsed_never_negative() {
        let mut session = started();
        session.total_pause_sec = 500;
        assert_eq!(live_elapsed(&session, t(100)), 0);
        assert_eq!(live_elapsed(&started(), t(-5)), 0);
    }
}
