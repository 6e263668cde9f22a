//! Build command: provider history to upcoming-announcement tables.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use ec_core::{CalendarTables, Resolver, build_tables};

use crate::{Config, input, workbook};

/// Runs the build command and returns the tables it wrote.
pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    history_path: &Path,
    workbook_dir: &Path,
    today: NaiveDate,
) -> Result<CalendarTables> {
    let resolver_config = config
        .resolver_config()
        .context("invalid resolution settings")?;
    let history = input::read_history(history_path)?;

    writeln!(writer, "Building calendar from {}", history_path.display())?;
    tracing::info!(
        rows = history.rows.len(),
        sectors = config.universe.len(),
        %today,
        "building calendar tables"
    );

    let tables = build_tables(
        &config.universe,
        &history.rows,
        today,
        &Resolver::new(&resolver_config),
    );
    workbook::write_tables(workbook_dir, &tables)?;

    writeln!(writer, "Workbook:         {}", workbook_dir.display())?;
    writeln!(writer, "Calendar rows:    {}", tables.calendar.len())?;
    writeln!(writer, "Tickers:          {}", tables.next_per_ticker.len())?;
    writeln!(writer, "Without upcoming: {}", tables.invalid.len())?;
    if history.undecodable > 0 {
        writeln!(writer, "Undecodable rows: {}", history.undecodable)?;
    }

    Ok(tables)
}
