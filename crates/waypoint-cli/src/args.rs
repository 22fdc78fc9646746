use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{PlanCommands, StepCommands};

/// Command-line interface for the Waypoint plan tracker
///
/// A plan is an ordered set of steps that may depend on each other. The plan
/// status is always derived from the step statuses, and `wp plan next` tells
/// you which step can be worked on now. Run `wp serve` to expose the same
/// operations to AI assistants over MCP.
#[derive(Parser)]
#[command(version, about, name = "wp")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/waypoint/waypoint.db
    #[arg(long, global = true, env = "WAYPOINT_DATABASE_FILE")]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// User ID that owns new plans and filters `plan list`
    #[arg(long, global = true, env = "WAYPOINT_USER")]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Waypoint CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Manage plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage steps within plans
    #[command(alias = "s")]
    Step {
        #[command(subcommand)]
        command: StepCommands,
    },
    /// Check that the database is reachable
    Health,
    /// Start the MCP server on stdio
    Serve,
}
