//! CLI subcommand implementations.

pub mod active;
pub mod log;
pub mod reports;
pub mod summary;
pub mod timer;
pub mod util;

use wt_core::SessionController;
use wt_db::Database;

/// Controller over the SQLite store, as used by every command.
pub type Controller = SessionController<Database>;
