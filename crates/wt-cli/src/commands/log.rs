//! Log command for listing an employee's sessions.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;
use wt_core::{EmployeeId, WorkSession, engine};

use super::Controller;
use super::util::{format_duration, format_time};

pub fn run<W: Write>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    limit: usize,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let sessions = controller.session_log(employee, limit)?;
    if json {
        let body = json!({ "logs": sessions });
        writeln!(writer, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        write!(writer, "{}", format_log(employee, &sessions, now))?;
    }
    Ok(())
}

/// Formats sessions as a table, newest first.
///
/// Open sessions show their live elapsed time in the Worked column.
pub fn format_log(employee: &EmployeeId, sessions: &[WorkSession], now: DateTime<Utc>) -> String {
    let mut output = String::new();

    writeln!(output, "SESSIONS for {employee} (UTC)").unwrap();
    writeln!(output).unwrap();

    if sessions.is_empty() {
        writeln!(output, "No sessions recorded.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<19}  {:<19}  {:>8}  {:>8}  State",
        "Started", "Ended", "Worked", "Paused"
    )
    .unwrap();
    writeln!(
        output,
        "───────────────────  ───────────────────  ────────  ────────  ───────"
    )
    .unwrap();

    for session in sessions {
        let ended = session
            .end_time
            .map_or_else(|| "-".to_string(), format_time);
        writeln!(
            output,
            "{:<19}  {:<19}  {:>8}  {:>8}  {}",
            format_time(session.start_time),
            ended,
            format_duration(engine::live_elapsed(session, now)),
            format_duration(session.total_pause_sec),
            session.state()
        )
        .unwrap();
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use insta::assert_snapshot;
    use wt_core::SessionController;
    use wt_db::Database;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
    }

    #[test]
    fn log_lists_closed_and_open_sessions() {
        let controller = SessionController::new(Database::open_in_memory().unwrap());
        let employee = EmployeeId::new("emp-1").unwrap();

        controller.start_session_at(&employee, t(0)).unwrap();
        controller.pause_session_at(&employee, t(30)).unwrap();
        controller.resume_session_at(&employee, t(50)).unwrap();
        controller.stop_session_at(&employee, t(80)).unwrap();
        controller.start_session_at(&employee, t(1_000)).unwrap();

        let mut buf = Vec::new();
        run(&mut buf, &controller, &employee, 10, t(1_100), false).unwrap();

        assert_snapshot!(String::from_utf8(buf).unwrap(), @r"
SESSIONS for emp-1 (UTC)

Started              Ended                  Worked    Paused  State
───────────────────  ───────────────────  ────────  ────────  ───────
2026-01-15 09:16:40  -                      1m 40s        0s  running
2026-01-15 09:00:00  2026-01-15 09:01:20     1m 0s       20s  closed
");
    }

    #[test]
    fn log_respects_limit() {
        let controller = SessionController::new(Database::open_in_memory().unwrap());
        let employee = EmployeeId::new("emp-1").unwrap();
        for start in [0, 100, 200] {
            controller.start_session_at(&employee, t(start)).unwrap();
            controller.stop_session_at(&employee, t(start + 10)).unwrap();
        }

        let mut buf = Vec::new();
        run(&mut buf, &controller, &employee, 2, t(300), true).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let logs = body["logs"].as_array().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0]["startTime"], "2026-01-15T09:03:20Z");
        assert_eq!(logs[0]["durationSec"], 10);
    }

    #[test]
    fn log_without_sessions() {
        let employee = EmployeeId::new("emp-1").unwrap();
        assert_eq!(
            format_log(&employee, &[], t(0)),
            "SESSIONS for emp-1 (UTC)\n\nNo sessions recorded.\n"
        );
    }
}
