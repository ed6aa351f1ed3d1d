//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Unknown work report type.
    #[error("invalid report type: {value}")]
    InvalidReportType { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

define_string_id!(
    /// A validated employee identifier.
    ///
    /// Employee IDs are owned by the directory that issues them; the timer only
    /// requires them to be non-blank.
    EmployeeId, "employee ID"
);

define_string_id!(
    /// A validated work session identifier.
    SessionId, "session ID"
);

define_string_id!(
    /// A validated work report identifier.
    ReportId, "report ID"
);

impl SessionId {
    /// Generates a fresh random session ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl ReportId {
    /// Generates a fresh random report ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_id_rejects_empty() {
        assert!(EmployeeId::new("").is_err());
        assert!(EmployeeId::new("   ").is_err());
        assert!(EmployeeId::new("emp-1").is_ok());
    }

    #[test]
    fn employee_id_error_names_field() {
        let err = EmployeeId::new("").unwrap_err();
        assert_eq!(err.to_string(), "employee ID cannot be empty");
    }

    #[test]
    fn employee_id_serde_rejects_empty() {
        let result: Result<EmployeeId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn employee_id_serializes_as_plain_string() {
        let id = EmployeeId::new("emp-42").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"emp-42\"");
    }

    #[test]
    fn session_id_generate_is_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn employee_id_parses_from_str() {
        let id: EmployeeId = "emp-7".parse().unwrap();
        assert_eq!(id.as_ref(), "emp-7");
        assert!("".parse::<EmployeeId>().is_err());
    }
}
