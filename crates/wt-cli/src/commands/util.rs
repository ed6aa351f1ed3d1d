//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use wt_core::EmployeeId;

/// Pre-compiled regex for relative time parsing.
static RELATIVE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s+(second|minute|hour|day|week)s?\s+ago$")
        .expect("relative time regex is valid")
});

/// Conservative bounds for relative time parsing (~1000 years in seconds).
const MAX_RELATIVE_SECONDS: i64 = 1000 * 365 * 24 * 60 * 60;

/// Parse a datetime string as either ISO 8601 or relative time.
///
/// Supports:
/// - ISO 8601: "2026-01-15T10:30:00Z"
/// - Relative: "45 seconds ago", "30 minutes ago", "2 hours ago", "1 day ago", "1 week ago"
pub fn parse_datetime(s: &str) -> anyhow::Result<DateTime<Utc>> {
    parse_datetime_relative_to(s, Utc::now())
}

fn parse_datetime_relative_to(s: &str, now: DateTime<Utc>) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let Some(caps) = RELATIVE_TIME_RE.captures(s.trim()) else {
        anyhow::bail!(
            "Invalid datetime: {s}. Use ISO 8601 (e.g., 2026-01-15T10:30:00Z) or relative (e.g., '2 hours ago')"
        );
    };

    let n: i64 = caps[1]
        .parse()
        .context("failed to parse number in relative time")?;

    let seconds_per_unit = match &caps[2] {
        "second" => 1,
        "minute" => 60,
        "hour" => 60 * 60,
        "day" => 60 * 60 * 24,
        "week" => 60 * 60 * 24 * 7,
        unit => anyhow::bail!("Unknown time unit: {unit}"),
    };

    if n > MAX_RELATIVE_SECONDS / seconds_per_unit {
        anyhow::bail!("Relative time value too large: {n} {}", &caps[2]);
    }

    Ok(now - Duration::seconds(n * seconds_per_unit))
}

/// Picks the employee from the command line, falling back to config.
pub fn resolve_employee(
    flag: Option<&str>,
    configured: Option<&str>,
) -> anyhow::Result<EmployeeId> {
    let raw = flag.or(configured).context(
        "no employee given. Pass --employee <ID> or set employee_id in the config file",
    )?;
    EmployeeId::new(raw).context("invalid employee ID")
}

/// Formats whole seconds for display.
///
/// Returns "Xh Ym" from one hour up, "Xm Ys" from one minute up, otherwise "Xs".
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else if minutes >= 1 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Formats a UTC timestamp for tables.
pub fn format_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "ratio is in [0, 1] and the result is at most 10"
)]
pub fn progress_bar(value: u64, max: u64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn parse_datetime_accepts_rfc3339() {
        let parsed = parse_datetime("2026-01-15T10:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2026, 1, 15, 8, 30, 0).unwrap());
    }

    #[test]
    fn parse_datetime_accepts_relative_units() {
        let cases = [
            ("45 seconds ago", now() - Duration::seconds(45)),
            ("1 minute ago", now() - Duration::minutes(1)),
            ("2 hours ago", now() - Duration::hours(2)),
            ("3 days ago", now() - Duration::days(3)),
            ("1 week ago", now() - Duration::weeks(1)),
        ];
        for (input, expected) in cases {
            assert_eq!(parse_datetime_relative_to(input, now()).unwrap(), expected);
        }
    }

    #[test]
    fn parse_datetime_rejects_garbage() {
        let err = parse_datetime_relative_to("tomorrow-ish", now()).unwrap_err();
        assert!(err.to_string().contains("Invalid datetime"));
    }

    #[test]
    fn parse_datetime_rejects_huge_relative_values() {
        let err = parse_datetime_relative_to("99999999 weeks ago", now()).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn resolve_employee_prefers_flag() {
        let id = resolve_employee(Some("emp-flag"), Some("emp-config")).unwrap();
        assert_eq!(id.as_str(), "emp-flag");
        let id = resolve_employee(None, Some("emp-config")).unwrap();
        assert_eq!(id.as_str(), "emp-config");
    }

    #[test]
    fn resolve_employee_requires_some_source() {
        let err = resolve_employee(None, None).unwrap_err();
        assert!(err.to_string().contains("no employee given"));
        assert!(resolve_employee(Some("  "), None).is_err());
    }

    #[test]
    fn format_duration_picks_largest_units() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(3_599), "59m 59s");
        assert_eq!(format_duration(3_600), "1h 0m");
        assert_eq!(format_duration(9_000), "2h 30m");
    }

    #[test]
    fn progress_bar_scales_to_max() {
        assert_eq!(progress_bar(0, 0), "░░░░░░░░░░");
        assert_eq!(progress_bar(10, 10), "██████████");
        assert_eq!(progress_bar(5, 10), "█████░░░░░");
        assert_eq!(progress_bar(1, 100), "█░░░░░░░░░");
        assert_eq!(progress_bar(0, 100), "░░░░░░░░░░");
    }
}
