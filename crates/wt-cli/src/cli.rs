//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use wt_core::ReportType;

/// Work session timer.
///
/// One stopwatch per employee: start it, pause and resume it, and stop it to
/// record the net worked time.
#[derive(Debug, Parser)]
#[command(name = "wt", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Employee to act on (defaults to `employee_id` from config).
    #[arg(short, long, global = true)]
    pub employee: Option<String>,

    /// Evaluate the command at this instant instead of now.
    ///
    /// Accepts ISO 8601 (2026-01-15T09:00:00Z) or relative time (2 hours ago).
    #[arg(long, global = true)]
    pub at: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the timer.
    Start {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Pause the running timer.
    Pause {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resume a paused timer.
    Resume {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Stop the timer and record the worked time.
    Stop {
        #[command(flatten)]
        report: ReportArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the current timer state.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List recent sessions.
    Log {
        /// Maximum number of sessions to show (defaults to `log_limit` from config).
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List every employee with an open timer.
    Active {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show worked time per day.
    Summary {
        /// Number of days to include, ending today (defaults to `summary_days` from config).
        #[arg(long)]
        days: Option<u32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List submitted work reports.
    Reports {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Optional work report filed with `stop`.
#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// Describe what was worked on.
    #[arg(long = "report")]
    pub content: Option<String>,

    /// Report type: daily, weekly, monthly, project or custom.
    #[arg(long, default_value = "daily")]
    pub report_type: ReportType,
}
