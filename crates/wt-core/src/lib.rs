//! Core domain logic for the work session timer.
//!
//! This crate contains the fundamental types and logic for:
//! - Timer engine: pure start/pause/resume/stop transitions and elapsed-time arithmetic
//! - Session controller: one open session per employee, enforced against a [`SessionStore`]
//! - Summaries: daily worked hours and per-employee totals
//! - Work reports submitted when a timer stops

mod cache;
mod controller;
pub mod engine;
pub mod report;
mod session;
mod store;
pub mod summary;
mod types;

pub use cache::TtlCache;
pub use controller::{ActiveTimer, SessionController, StopOutcome, TimerError, TimerStatus};
pub use engine::{EngineError, Operation};
pub use report::{ReportType, WorkReport};
pub use session::{SessionState, WorkSession};
pub use store::{MemoryStore, SessionStore, StoreError};
pub use types::{EmployeeId, ReportId, SessionId, ValidationError};
