use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wt_cli::commands::{Controller, active, log, reports, summary, timer, util};
use wt_cli::{Cli, Commands, Config};
use wt_core::SessionController;

/// Load config and open the controller, ensuring the database directory exists.
///
/// Each invocation does at most one status lookup, so no status cache is set up.
fn open_controller(config_path: Option<&Path>) -> Result<(Controller, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = wt_db::Database::open(&config.database_path).context("failed to open database")?;
    let controller = SessionController::new(db);
    Ok((controller, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let now = match cli.at.as_deref() {
        Some(at) => util::parse_datetime(at)?,
        None => Utc::now(),
    };

    let (controller, config) = open_controller(cli.config.as_deref())?;
    let employee = || util::resolve_employee(cli.employee.as_deref(), config.employee_id.as_deref());
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Start { json } => timer::start(&mut out, &controller, &employee()?, now, *json)?,
        Commands::Pause { json } => timer::pause(&mut out, &controller, &employee()?, now, *json)?,
        Commands::Resume { json } => {
            timer::resume(&mut out, &controller, &employee()?, now, *json)?;
        }
        Commands::Stop { report, json } => {
            timer::stop(&mut out, &controller, &employee()?, now, report, *json)?;
        }
        Commands::Status { json } => {
            timer::status(&mut out, &controller, &employee()?, now, *json)?;
        }
        Commands::Log { limit, json } => {
            let limit = limit.unwrap_or(config.log_limit);
            log::run(&mut out, &controller, &employee()?, limit, now, *json)?;
        }
        Commands::Active { json } => active::run(&mut out, &controller, now, *json)?,
        Commands::Summary { days, json } => {
            let timezone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
            let today = now.with_timezone(&Local).date_naive();
            summary::run(
                &mut out,
                &controller,
                &employee()?,
                &Local,
                &timezone,
                today,
                days.unwrap_or(config.summary_days),
                *json,
            )?;
        }
        Commands::Reports { json } => reports::run(&mut out, &controller, &employee()?, *json)?,
    }

    Ok(())
}
