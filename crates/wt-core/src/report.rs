//! Work reports filed when a timer stops.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, ReportId, SessionId, ValidationError};

/// Kind of work report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Project,
    Custom,
}

impl ReportType {
    pub const ALL: [Self; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Project,
        Self::Custom,
    ];

    /// String representation for database storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Project => "project",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ReportType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lowered)
            .ok_or_else(|| ValidationError::InvalidReportType {
                value: s.to_string(),
            })
    }
}

/// A free-text account of the work done, optionally tied to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkReport {
    pub id: ReportId,
    pub employee_id: EmployeeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub report_type: ReportType,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
}

impl WorkReport {
    /// Creates a report with a fresh ID. Content is trimmed and must not be blank.
    pub fn new(
        employee_id: EmployeeId,
        session_id: Option<SessionId>,
        report_type: ReportType,
        content: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let content = validate_content(content)?;
        Ok(Self {
            id: ReportId::generate(),
            employee_id,
            session_id,
            report_type,
            content,
            submitted_at,
        })
    }
}

/// Trims report content, rejecting blank text.
pub fn validate_content(content: &str) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty {
            field: "report content",
        });
    }
    Ok(trimmed.to_string())
}
