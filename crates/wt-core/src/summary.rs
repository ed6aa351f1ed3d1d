//! Worked-time summaries over stored sessions.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, TimeZone};
use serde::Serialize;

use crate::session::WorkSession;

/// Worked time for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyWork {
    pub date: NaiveDate,
    pub worked_sec: u64,
}

impl DailyWork {
    #[expect(
        clippy::cast_precision_loss,
        reason = "second counts stay far below f64's exact integer range"
    )]
    pub fn hours(&self) -> f64 {
        self.worked_sec as f64 / 3600.0
    }
}

/// Session counts and total worked time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTotals {
    pub closed_count: usize,
    pub open_count: usize,
    pub total_duration_sec: u64,
}

/// Buckets worked time into `days` consecutive calendar days ending at `end`.
///
/// Each session counts toward the day its start time falls on in `tz`.
/// Open sessions contribute nothing until they are stopped. Sessions outside
/// the window are ignored.
pub fn daily_series<Tz: TimeZone>(
    sessions: &[WorkSession],
    tz: &Tz,
    end: NaiveDate,
    days: u32,
) -> Vec<DailyWork> {
    let Some(first) = days
        .checked_sub(1)
        .and_then(|back| end.checked_sub_days(Days::new(u64::from(back))))
    else {
        return Vec::new();
    };

    let mut buckets: BTreeMap<NaiveDate, u64> = first
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| (date, 0))
        .collect();

    for session in sessions {
        let Some(duration) = session.duration_sec else {
            continue;
        };
        let day = session.start_time.with_timezone(tz).date_naive();
        if let Some(worked) = buckets.get_mut(&day) {
            *worked = worked.saturating_add(duration);
        }
    }

    buckets
        .into_iter()
        .map(|(date, worked_sec)| DailyWork { date, worked_sec })
        .collect()
}

/// Counts sessions and sums the worked time of closed ones.
pub fn totals(sessions: &[WorkSession]) -> SessionTotals {
    sessions
        .iter()
        .fold(SessionTotals::default(), |mut totals, session| {
            match session.duration_sec {
                Some(duration) if !session.is_open() => {
                    totals.closed_count += 1;
                    totals.total_duration_sec = totals.total_duration_sec.saturating_add(duration);
                }
                _ => totals.open_count += 1,
            }
            totals
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, Duration, FixedOffset, Utc};

    use crate::types::{EmployeeId, SessionId};

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn closed(id: &str, start: &str, duration_sec: u64) -> WorkSession {
        let start = at(start);
        let mut session = WorkSession::new(
            SessionId::new(id).unwrap(),
            EmployeeId::new("emp-1").unwrap(),
            start,
        );
        let secs = i64::try_from(duration_sec).unwrap();
        session.end_time = Some(start + Duration::seconds(secs));
        session.duration_sec = Some(duration_sec);
        session
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn daily_series_fills_every_day() {
        let series = daily_series(&[], &Utc, date("2026-01-15"), 3);
        let dates: Vec<_> = series.iter().map(|d| d.date).collect();
        assert_eq!(
            dates,
            vec![date("2026-01-13"), date("2026-01-14"), date("2026-01-15")]
        );
        assert!(series.iter().all(|d| d.worked_sec == 0));
    }

    #[test]
    fn daily_series_buckets_by_start_day() {
        let sessions = vec![
            closed("a", "2026-01-14T09:00:00Z", 3_600),
            closed("b", "2026-01-14T23:30:00Z", 5_400),
            closed("c", "2026-01-15T08:00:00Z", 1_800),
            closed("old", "2026-01-01T08:00:00Z", 9_999),
        ];

        let series = daily_series(&sessions, &Utc, date("2026-01-15"), 2);
        assert_eq!(series[0].worked_sec, 9_000);
        assert_eq!(series[1].worked_sec, 1_800);
        assert!((series[0].hours() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn daily_series_respects_timezone() {
        let sessions = vec![closed("late", "2026-01-14T23:30:00Z", 600)];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let series = daily_series(&sessions, &plus_two, date("2026-01-15"), 2);
        assert_eq!(series[0].worked_sec, 0);
        assert_eq!(series[1].worked_sec, 600);
    }

    #[test]
    fn daily_series_ignores_open_sessions() {
        let open = WorkSession::new(
            SessionId::new("open").unwrap(),
            EmployeeId::new("emp-1").unwrap(),
            at("2026-01-15T08:00:00Z"),
        );
        let series = daily_series(&[open], &Utc, date("2026-01-15"), 1);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].worked_sec, 0);
    }

    #[test]
    fn daily_series_with_zero_days_is_empty() {
        assert!(daily_series(&[], &Utc, date("2026-01-15"), 0).is_empty());
    }

    #[test]
    fn totals_split_open_and_closed() {
        let open = WorkSession::new(
            SessionId::new("open").unwrap(),
            EmployeeId::new("emp-1").unwrap(),
            at("2026-01-15T08:00:00Z"),
        );
        let sessions = vec![
            closed("a", "2026-01-14T09:00:00Z", 100),
            closed("b", "2026-01-14T10:00:00Z", 200),
            open,
        ];

        assert_eq!(
            totals(&sessions),
            SessionTotals {
                closed_count: 2,
                open_count: 1,
                total_duration_sec: 300,
            }
        );
    }
}
