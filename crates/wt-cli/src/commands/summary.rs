//! Summary command for worked time per day.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use wt_core::summary::{self, DailyWork, SessionTotals};
use wt_core::EmployeeId;

use super::Controller;
use super::util::{format_duration, progress_bar};

/// Computed summary data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub employee_id: EmployeeId,
    pub timezone: String,
    pub days: Vec<DailyWork>,
    pub totals: SessionTotals,
}

/// Builds per-day worked time for the `days` days ending at `today` in `tz`.
pub fn generate_summary_data<Tz: TimeZone>(
    controller: &Controller,
    employee: &EmployeeId,
    tz: &Tz,
    timezone: &str,
    today: NaiveDate,
    days: u32,
) -> Result<SummaryData> {
    let sessions = controller.session_log(employee, usize::MAX)?;
    let series = summary::daily_series(&sessions, tz, today, days);

    // Totals cover only sessions that started inside the window.
    let first_day = series.first().map(|d| d.date);
    let in_window: Vec<_> = sessions
        .into_iter()
        .filter(|s| {
            let day = s.start_time.with_timezone(tz).date_naive();
            first_day.is_some_and(|first| day >= first && day <= today)
        })
        .collect();

    Ok(SummaryData {
        employee_id: employee.clone(),
        timezone: timezone.to_string(),
        days: series,
        totals: summary::totals(&in_window),
    })
}

pub fn format_summary(data: &SummaryData) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "WORKED TIME for {} (last {} days, {})",
        data.employee_id,
        data.days.len(),
        data.timezone
    )
    .unwrap();
    writeln!(output).unwrap();

    let max = data.days.iter().map(|d| d.worked_sec).max().unwrap_or(0);
    for day in &data.days {
        writeln!(
            output,
            "{}  {}  {}",
            day.date.format("%a %Y-%m-%d"),
            progress_bar(day.worked_sec, max),
            format_duration(day.worked_sec)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    let totals = &data.totals;
    write!(
        output,
        "Total: {} over {} sessions",
        format_duration(totals.total_duration_sec),
        totals.closed_count
    )
    .unwrap();
    if totals.open_count > 0 {
        write!(output, " ({} still open)", totals.open_count).unwrap();
    }
    writeln!(output).unwrap();

    output
}

#[expect(
    clippy::too_many_arguments,
    reason = "command entry points take their inputs unbundled"
)]
pub fn run<W: Write, Tz: TimeZone>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    tz: &Tz,
    timezone: &str,
    today: NaiveDate,
    days: u32,
    json: bool,
) -> Result<()> {
    let data = generate_summary_data(controller, employee, tz, timezone, today, days)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
    } else {
        write!(writer, "{}", format_summary(&data))?;
    }
    Ok(())
}
