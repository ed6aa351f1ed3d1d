//! Timer commands: start, pause, resume, stop and status.
//!
//! With `--json` each command prints the same body the HTTP API returned:
//! `{"startTime"}` for start, `{}` for pause and resume, `{"durationSec"}` for
//! stop, and the timer status object for status.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use wt_core::{EmployeeId, WorkReport};

use super::Controller;
use super::util::format_duration;
use crate::ReportArgs;

pub fn start<W: Write>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let start_time = controller.start_session_at(employee, now)?;
    if json {
        writeln!(writer, "{}", json!({ "startTime": start_time }))?;
    } else {
        writeln!(writer, "Timer started at {}", start_time.to_rfc3339())?;
    }
    Ok(())
}

pub fn pause<W: Write>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    controller.pause_session_at(employee, now)?;
    if json {
        writeln!(writer, "{{}}")?;
    } else {
        writeln!(writer, "Timer paused")?;
    }
    Ok(())
}

pub fn resume<W: Write>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    controller.resume_session_at(employee, now)?;
    if json {
        writeln!(writer, "{{}}")?;
    } else {
        writeln!(writer, "Timer resumed")?;
    }
    Ok(())
}

/// Stops the timer, then files the optional report against the closed session.
///
/// Report content is validated before stopping, so a blank report leaves the
/// timer running.
pub fn stop<W: Write>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    now: DateTime<Utc>,
    report: &ReportArgs,
    json: bool,
) -> Result<()> {
    let content = report
        .content
        .as_deref()
        .map(wt_core::report::validate_content)
        .transpose()?;

    let outcome = controller.stop_session_at(employee, now)?;

    if let Some(content) = content {
        let filed = WorkReport::new(
            employee.clone(),
            Some(outcome.session_id.clone()),
            report.report_type,
            &content,
            now,
        )?;
        controller
            .store()
            .insert_report(&filed)
            .context("timer stopped but the report could not be saved")?;
        tracing::info!(employee = %employee, report = %filed.id, "work report filed");
        if !json {
            writeln!(writer, "Filed {} report", filed.report_type)?;
        }
    }

    if json {
        writeln!(writer, "{}", json!({ "durationSec": outcome.duration_sec }))?;
    } else {
        writeln!(
            writer,
            "Timer stopped: worked {} ({}s)",
            format_duration(outcome.duration_sec),
            outcome.duration_sec
        )?;
    }
    Ok(())
}

pub fn status<W: Write>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let status = controller.get_status_at(employee, now)?;
    if json {
        writeln!(writer, "{}", serde_json::to_string(&status)?)?;
        return Ok(());
    }

    let (Some(start_time), Some(is_paused), Some(elapsed)) =
        (status.start_time, status.is_paused, status.elapsed_sec)
    else {
        writeln!(writer, "No active timer for {employee}")?;
        return Ok(());
    };

    let state = if is_paused { "paused" } else { "running" };
    writeln!(writer, "Timer {state} for {employee}")?;
    writeln!(writer, "Started: {}", start_time.to_rfc3339())?;
    writeln!(writer, "Worked:  {} ({elapsed}s)", format_duration(elapsed))?;
    Ok(())
}
