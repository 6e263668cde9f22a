//! Run command: build the tables, then the calendar from the next-per-ticker table.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::Config;
use crate::commands::{build, ics};

/// Runs both pipeline stages with paths from the configuration.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    today: NaiveDate,
    generated_at: DateTime<Utc>,
) -> Result<()> {
    build::run(
        writer,
        config,
        &config.history_path,
        &config.workbook_dir,
        today,
    )?;
    writeln!(writer)?;
    ics::run(
        writer,
        config,
        &config.next_per_ticker_path(),
        &config.calendar_path,
        generated_at,
    )?;
    Ok(())
}
