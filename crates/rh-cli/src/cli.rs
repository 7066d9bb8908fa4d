//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Leave calendar and time-card dashboards.
///
/// Reads leave and punch tables (comma, semicolon or tab separated) and
/// renders calendars, occupancy and punch reconciliation reports.
#[derive(Debug, Parser)]
#[command(name = "rh", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Leave calendar views.
    #[command(subcommand)]
    Leave(LeaveAction),

    /// Time-card analysis.
    #[command(subcommand)]
    Punch(PunchCommand),
}

/// Views over a leave table.
#[derive(Debug, Subcommand)]
pub enum LeaveAction {
    /// Render a Monday-first calendar listing who is away each day.
    Calendar {
        /// Leave table (defaults to `leave_source` from the config).
        #[arg(long)]
        file: Option<PathBuf>,

        /// Reporting year (defaults to `year` from the config).
        #[arg(long)]
        year: Option<i32>,

        /// Single month to render (1-12). All twelve when omitted.
        #[arg(long)]
        month: Option<u32>,
    },

    /// List who is on leave on one day.
    Day {
        /// Leave table (defaults to `leave_source` from the config).
        #[arg(long)]
        file: Option<PathBuf>,

        /// The day to look up (e.g., 2025-03-10 or 10/03/2025).
        #[arg(long)]
        date: String,
    },

    /// Show how many people are away on each day of a year.
    Occupancy {
        /// Leave table (defaults to `leave_source` from the config).
        #[arg(long)]
        file: Option<PathBuf>,

        /// Reporting year (defaults to `year` from the config).
        #[arg(long)]
        year: Option<i32>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

/// Views over a punch table.
#[derive(Debug, Subcommand)]
pub enum PunchCommand {
    /// Reconcile one month of punches.
    Report {
        /// Punch table (defaults to `punch_source` from the config).
        #[arg(long)]
        file: Option<PathBuf>,

        /// Reporting year (defaults to `year` from the config).
        #[arg(long)]
        year: Option<i32>,

        /// Reporting month (1-12).
        #[arg(long)]
        month: u32,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}
