//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Earnings announcement calendar.
///
/// Turns scheduled earnings announcements into upcoming-announcement tables
/// and a calendar subscription file.
#[derive(Debug, Parser)]
#[command(name = "ec", version, about, long_about = None)]
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
    /// Build the upcoming-announcement tables from provider history.
    Build {
        /// Provider history CSV (overrides `history_path`).
        #[arg(long)]
        history: Option<PathBuf>,

        /// Directory for the table CSVs (overrides `workbook_dir`).
        #[arg(long)]
        workbook: Option<PathBuf>,

        /// Reference date; earlier announcements are dropped.
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Write the calendar subscription file from an announcement table.
    Ics {
        /// Announcement CSV (defaults to the next-per-ticker table).
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output `.ics` file (overrides `calendar_path`).
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Build the tables, then write the calendar from the next-per-ticker table.
    Run {
        /// Reference date; earlier announcements are dropped.
        #[arg(long)]
        today: Option<NaiveDate>,
    },

    /// Print resolved events as JSON lines.
    Events {
        /// Announcement CSV (defaults to the next-per-ticker table).
        #[arg(long)]
        input: Option<PathBuf>,
    },
}
