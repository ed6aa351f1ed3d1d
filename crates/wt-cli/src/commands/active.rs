//! Active command for listing every open timer.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;
use wt_core::ActiveTimer;

use super::Controller;
use super::util::{format_duration, format_time};

pub fn run<W: Write>(
    writer: &mut W,
    controller: &Controller,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let timers = controller.active_timers_at(now)?;
    if json {
        let body = json!({ "active": timers });
        writeln!(writer, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        write!(writer, "{}", format_active(&timers))?;
    }
    Ok(())
}

pub fn format_active(timers: &[ActiveTimer]) -> String {
    let mut output = String::new();

    writeln!(output, "ACTIVE TIMERS (UTC)").unwrap();
    writeln!(output).unwrap();

    if timers.is_empty() {
        writeln!(output, "Nobody is on the clock.").unwrap();
        return output;
    }

    writeln!(
        output,
        "{:<16}  {:<19}  {:>8}  State",
        "Employee", "Started", "Worked"
    )
    .unwrap();
    writeln!(
        output,
        "────────────────  ───────────────────  ────────  ───────"
    )
    .unwrap();

    for timer in timers {
        let employee = timer.employee_id.as_str();
        // Truncate by characters, not bytes, to avoid panics on multi-byte UTF-8
        let employee = if employee.chars().count() > 16 {
            format!("{}...", employee.chars().take(13).collect::<String>())
        } else {
            employee.to_string()
        };
        let state = if timer.is_paused { "paused" } else { "running" };
        writeln!(
            output,
            "{:<16}  {:<19}  {:>8}  {}",
            employee,
            format_time(timer.start_time),
            format_duration(timer.elapsed_sec),
            state
        )
        .unwrap();
    }

    output
}
