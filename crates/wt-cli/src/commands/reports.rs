//! Reports command for listing submitted work reports.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use serde_json::json;
use wt_core::{EmployeeId, WorkReport};

use super::Controller;
use super::util::format_time;

pub fn run<W: Write>(
    writer: &mut W,
    controller: &Controller,
    employee: &EmployeeId,
    json: bool,
) -> Result<()> {
    let reports = controller
        .store()
        .list_reports(employee)
        .context("failed to load work reports")?;
    if json {
        let body = json!({ "reports": reports });
        writeln!(writer, "{}", serde_json::to_string_pretty(&body)?)?;
    } else {
        write!(writer, "{}", format_reports(employee, &reports))?;
    }
    Ok(())
}

/// Formats reports newest first. Multi-line content is indented under its row.
pub fn format_reports(employee: &EmployeeId, reports: &[WorkReport]) -> String {
    let mut output = String::new();

    writeln!(output, "REPORTS for {employee} (UTC)").unwrap();
    writeln!(output).unwrap();

    if reports.is_empty() {
        writeln!(output, "No reports filed.").unwrap();
        return output;
    }

    for report in reports {
        let mut lines = report.content.lines();
        let first = lines.next().unwrap_or_default();
        writeln!(
            output,
            "{:<19}  {:<7}  {}",
            format_time(report.submitted_at),
            report.report_type.as_str(),
            first
        )
        .unwrap();
        for line in lines {
            writeln!(output, "{:<30}{line}", "").unwrap();
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{DateTime, TimeZone, Utc};
    use wt_core::{ReportType, SessionController};
    use wt_db::Database;

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap() + chrono::Duration::seconds(seconds)
    }

    fn file(controller: &Controller, employee: &EmployeeId, kind: ReportType, text: &str, at: i64) {
        let report = WorkReport::new(employee.clone(), None, kind, text, t(at)).unwrap();
        controller.store().insert_report(&report).unwrap();
    }

    #[test]
    fn reports_listed_newest_first() {
        let controller = SessionController::new(Database::open_in_memory().unwrap());
        let employee = EmployeeId::new("emp-1").unwrap();
        file(&controller, &employee, ReportType::Daily, "triaged inbox", 0);
        file(
            &controller,
            &employee,
            ReportType::Weekly,
            "shipped payroll export\nfixed leave balance bug",
            3_600,
        );

        let mut buf = Vec::new();
        run(&mut buf, &controller, &employee, false).unwrap();

        let expected = [
            "REPORTS for emp-1 (UTC)",
            "",
            "2026-01-15 10:00:00  weekly   shipped payroll export",
            "                              fixed leave balance bug",
            "2026-01-15 09:00:00  daily    triaged inbox",
        ];
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            format!("{}\n", expected.join("\n"))
        );
    }

    #[test]
    fn reports_json_uses_camel_case() {
        let controller = SessionController::new(Database::open_in_memory().unwrap());
        let employee = EmployeeId::new("emp-1").unwrap();
        file(&controller, &employee, ReportType::Project, "audit", 0);

        let mut buf = Vec::new();
        run(&mut buf, &controller, &employee, true).unwrap();
        let body: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        let report = &body["reports"][0];
        assert_eq!(report["employeeId"], "emp-1");
        assert_eq!(report["reportType"], "project");
        assert_eq!(report["content"], "audit");
        assert_eq!(report["submittedAt"], "2026-01-15T09:00:00Z");
        assert!(report.get("sessionId").is_none());
    }

    #[test]
    fn reports_empty_message() {
        let employee = EmployeeId::new("emp-1").unwrap();
        assert_eq!(
            format_reports(&employee, &[]),
            "REPORTS for emp-1 (UTC)\n\nNo reports filed.\n"
        );
    }
}
