//! Work session timer CLI library.
//!
//! This crate provides the CLI interface for the work session timer.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ReportArgs};
pub use config::Config;
